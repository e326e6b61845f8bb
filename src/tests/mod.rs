pub mod cache_tests;
