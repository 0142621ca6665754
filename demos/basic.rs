use steady_http::{ApiClient, RequestSpec, ResponseType};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ApiClient::new("http://localhost:9009")?;

    let shape = client
        .api_request(
            RequestSpec::get("/items")
                .param("page", "1")
                .response_type(ResponseType::Text),
        )
        .await?;

    if let Some(body) = shape.text() {
        println!("{body}");
    }

    Ok(())
}
