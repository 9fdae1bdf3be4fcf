pub mod scripted_fetcher;
