pub mod review_response;
