#[tokio::main]
async fn main() -> std::process::ExitCode {
    membership::start(std::env::args()).await
}
