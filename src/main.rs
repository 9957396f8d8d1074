#[actix_web::main]
async fn main() -> std::io::Result<()> {
    bewohner_app_server::run().await
}
