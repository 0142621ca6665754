use serde_json::json;
use steady_http::{ApiClient, ItemService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = ApiClient::new("http://localhost:9009")?;
    let mut service = ItemService::new(client);

    service.login("user1", "secret1").await?;

    let created = service
        .add_item(json!({
            "item_id": 1,
            "item_name": "item name"
        }))
        .await?;
    println!("created: {:?}", created.json());

    let fetched = service.get_item("1").await?;
    println!("fetched: {:?}", fetched.json());

    Ok(())
}
