// Include test modules
mod busy_controller_tests;
