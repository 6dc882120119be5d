use anyhow::{Context, Result};
use clap::Parser;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target URL (e.g., http://localhost:8000)
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Number of voters to simulate
    #[arg(short = 'n', long, default_value_t = 100)]
    users: usize,

    /// Number of concurrent requests
    #[arg(short, long, default_value_t = 10)]
    concurrency: usize,

    /// Admin key, used to seed names when the list is empty
    #[arg(short, long, default_value = "secret")]
    key: String,
}

#[derive(Deserialize, Debug)]
struct Name {
    id: i32,
    // name: String,
}

#[derive(Serialize)]
struct CastVoteRequest {
    name_id: i32,
    device_id: String,
    device_info: String,
}

#[derive(Serialize)]
struct AddNameRequest {
    key: String,
    name: String,
}

#[derive(Deserialize, Debug)]
struct ActionResult {
    ok: bool,
    error: Option<String>,
}

const PLATFORMS: [&str; 4] = ["Windows", "macOS", "Linux", "Android"];

fn fake_device_info(user_id: usize, platform: &str) -> String {
    json!({
        "deviceName": platform,
        "modelName": format!("LT-{:04}", user_id),
        "details": {
            "userAgent": format!("LoadTest/1.0 (user {})", user_id),
            "platform": platform,
            "language": "en-US",
            "screenWidth": 1920,
            "screenHeight": 1080,
        }
    })
    .to_string()
}

async fn run_voter_simulation(
    client: &Client,
    base_url: &str,
    user_id: usize,
    names: &[Name],
) -> Result<bool> {
    let platform = {
        let mut rng = rand::thread_rng();
        PLATFORMS[rng.gen_range(0..PLATFORMS.len())]
    };
    let device_id = Uuid::new_v4().to_string();
    let name = {
        let mut rng = rand::thread_rng();
        names.choose(&mut rng).context("No names available")?
    };

    let vote_url = format!("{}/api/vote", base_url);
    let request = CastVoteRequest {
        name_id: name.id,
        device_id: device_id.clone(),
        device_info: fake_device_info(user_id, platform),
    };

    // Distinct User-Agent per simulated voter so server fingerprints differ
    let user_agent = format!("LoadTest/1.0 (user {}; {})", user_id, platform);

    let first: ActionResult = client
        .post(&vote_url)
        .header("User-Agent", &user_agent)
        .json(&request)
        .send()
        .await
        .context("Failed to send vote request")?
        .json()
        .await
        .context("Failed to parse vote result")?;

    if !first.ok {
        anyhow::bail!("Vote rejected: {}", first.error.unwrap_or_default());
    }

    // Second vote from the same device must be refused as a duplicate
    let second: ActionResult = client
        .post(&vote_url)
        .header("User-Agent", &user_agent)
        .json(&request)
        .send()
        .await
        .context("Failed to send duplicate vote request")?
        .json()
        .await
        .context("Failed to parse duplicate vote result")?;

    Ok(!second.ok)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    println!("🚀 Starting load test against {}", args.url);
    println!("👥 Voters: {}", args.users);
    println!("⚡ Concurrency: {}", args.concurrency);

    let setup_client = Client::new();

    // Fetch names once; seed a few via the admin action when empty
    let names_url = format!("{}/api/names", args.url);
    let mut names: Vec<Name> = setup_client
        .get(&names_url)
        .send()
        .await
        .context("Failed to fetch names")?
        .json()
        .await
        .context("Failed to parse names")?;

    if names.is_empty() {
        for name in ["Alice", "Bob", "Carol"] {
            let result: ActionResult = setup_client
                .post(format!("{}/api/admin/names", args.url))
                .json(&AddNameRequest {
                    key: args.key.clone(),
                    name: name.to_string(),
                })
                .send()
                .await
                .context("Failed to send add-name request")?
                .json()
                .await
                .context("Failed to parse add-name result")?;
            if !result.ok {
                anyhow::bail!("Seeding failed: {}", result.error.unwrap_or_default());
            }
        }
        println!("🌱 Seeded names via Admin API");

        names = setup_client
            .get(&names_url)
            .send()
            .await
            .context("Failed to re-fetch names")?
            .json()
            .await
            .context("Failed to parse names")?;
    }

    if names.is_empty() {
        anyhow::bail!("No names found on the server. Cannot vote.");
    }
    println!("📋 Found {} names", names.len());

    let names = Arc::new(names);
    let base_url = Arc::new(args.url.clone());

    let success_count = Arc::new(AtomicUsize::new(0));
    let failure_count = Arc::new(AtomicUsize::new(0));
    let leak_count = Arc::new(AtomicUsize::new(0));

    let pb = ProgressBar::new(args.users as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({eta}) {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let start_time = Instant::now();

    let results = stream::iter(0..args.users)
        .map(|i| {
            let base_url = base_url.clone();
            let names = names.clone();
            let success_count = success_count.clone();
            let failure_count = failure_count.clone();
            let leak_count = leak_count.clone();
            let pb = pb.clone();

            async move {
                let client = Client::new();

                match run_voter_simulation(&client, &base_url, i, &names).await {
                    Ok(true) => {
                        success_count.fetch_add(1, Ordering::Relaxed);
                        pb.set_message(format!(
                            "Success: {}",
                            success_count.load(Ordering::Relaxed)
                        ));
                    }
                    Ok(false) => {
                        // duplicate vote was accepted
                        leak_count.fetch_add(1, Ordering::Relaxed);
                        pb.set_message(format!(
                            "Duplicate leaks: {}",
                            leak_count.load(Ordering::Relaxed)
                        ));
                    }
                    Err(_e) => {
                        failure_count.fetch_add(1, Ordering::Relaxed);
                        pb.set_message(format!(
                            "Errors: {}",
                            failure_count.load(Ordering::Relaxed)
                        ));
                    }
                }
                pb.inc(1);
            }
        })
        .buffer_unordered(args.concurrency)
        .collect::<Vec<()>>();

    results.await;

    pb.finish_with_message("Done");

    let duration = start_time.elapsed();
    let successes = success_count.load(Ordering::Relaxed);
    let failures = failure_count.load(Ordering::Relaxed);
    let leaks = leak_count.load(Ordering::Relaxed);
    let rps = successes as f64 / duration.as_secs_f64();

    println!("\n📊 Results:");
    println!("   Time taken: {:?}", duration);
    println!("   Total voters: {}", args.users);
    println!("   Successful votes: {}", successes);
    println!("   Accepted duplicates: {}", leaks);
    println!("   Failed votes: {}", failures);
    println!("   Throughput: {:.2} votes/sec", rps);

    Ok(())
}
