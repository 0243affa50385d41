mod notifier_factory_tests;
