use bike_flow::client::{self, DEFAULT_ADDR};

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), client::RetrieveError> {
    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    let mut stream = client::connect(&address).await?;

    let key = client::read_key("Enter the instance key to retrieve from the server:")?;

    client::send_key(&mut stream, &key).await?;
    let response = client::read_response(&mut stream).await?;

    let data = bike_flow::decode::decode(&response)?;
    println!("{data:#?}");

    Ok(())
}
