//! Integration tests with mock HTTP server

mod integration {
    pub mod facade_pipeline;
    pub mod mock_server;
    pub mod openai_http;
}
