use srql_compiler::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();
    srql_compiler::run().await
}
