mod listing_tests;
mod search_page_tests;
