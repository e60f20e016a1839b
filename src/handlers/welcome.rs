pub async fn welcome_handler() -> &'static str {
    "Welcome to the event counter"
}
