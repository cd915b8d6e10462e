mod proptest_codec;
mod scenario_tests;
mod session_tests;
