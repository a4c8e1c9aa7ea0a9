mod signal_unit_tests;
