pub mod clear_messages_route;
pub mod messages_response;
pub mod messages_route;
