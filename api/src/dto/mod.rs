//! Request and response bodies

pub mod verification;

pub use verification::{
    DispatchResponse, RequestCodeRequest, SubmitCodeRequest, VerifiedResponse,
};
