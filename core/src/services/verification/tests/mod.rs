mod code_generator_tests;
