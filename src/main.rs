use listing_smoke::{API_URL, Client, submit_listing};

#[tokio::main]
async fn main() {
    println!("Testing with large image (~50KB)...");

    let client = Client::new();
    match submit_listing(&client, API_URL).await {
        Ok(report) => println!("{report}"),
        Err(err) => println!("Error: {err}"),
    }
}
