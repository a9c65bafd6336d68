//! Integration tests for HandsUp

use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use handsup::models::{AmenityFilter, CampsiteCategory};
use handsup::warnings::{WarningFeed, parse_feed};
use handsup::{
    CampsiteDraft, CampsiteStore, Coordinates, EmergencyWarning, FjallStore, HandsUpError,
    KeyValueStore, MemoryStore, WarningAggregator, WarningSeverity, WarningType,
};
use tempfile::TempDir;

fn handsup(storage: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_handsup"));
    command
        .env("HANDSUP_STORAGE__LOCATION", storage.path())
        .env("RUST_LOG", "error")
        .arg("--config")
        .arg(storage.path().join("missing.toml"));
    command
}

/// Test that the CLI describes itself
#[test]
fn test_cli_help() {
    let storage = TempDir::new().unwrap();
    let output = handsup(&storage).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Emergency companion"));
    assert!(stdout.contains("campsite"));
    assert!(stdout.contains("warnings"));
}

#[test]
fn test_cli_lists_templates() {
    let storage = TempDir::new().unwrap();
    let output = handsup(&storage).arg("templates").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 8);
    assert!(stdout.contains("Snake Bite"));
}

#[test]
fn test_cli_sos_without_contacts_fails() {
    let storage = TempDir::new().unwrap();
    let output = handsup(&storage)
        .args(["sos", "--template", "Snake Bite", "--lat", "-33.7128", "--lon", "150.3119"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Lat: -33.712800, Long: 150.311900"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No emergency contacts"));
}

#[test]
fn test_cli_rejects_unknown_category() {
    let storage = TempDir::new().unwrap();
    let output = handsup(&storage)
        .args(["campsite", "list", "--category", "glamping"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown category"));
}

#[test]
fn test_cli_clamps_out_of_range_rating() {
    let storage = TempDir::new().unwrap();
    let added = handsup(&storage)
        .args([
            "campsite", "add", "--name", "Blue Mountains Bush Camp", "--address",
            "Blue Mountains National Park, NSW", "--lat", "-33.7128", "--lon", "150.3119",
            "--rating", "7",
        ])
        .output()
        .unwrap();
    assert!(added.status.success(), "{}", String::from_utf8_lossy(&added.stderr));

    let listed = handsup(&storage)
        .args(["--json", "campsite", "list"])
        .output()
        .unwrap();
    assert!(listed.status.success());
    let campsites: serde_json::Value = serde_json::from_slice(&listed.stdout).unwrap();
    assert_eq!(campsites.as_array().unwrap().len(), 1);
    assert_eq!(campsites[0]["rating"], 5);
    assert_eq!(campsites[0]["name"], "Blue Mountains Bush Camp");
}

#[test]
fn test_cli_rejects_duplicate_contact_number() {
    let storage = TempDir::new().unwrap();
    let first = handsup(&storage)
        .args(["contacts", "add", "Alex", "0400 000 001"])
        .output()
        .unwrap();
    assert!(first.status.success());

    let second = handsup(&storage)
        .args(["contacts", "add", "Alex", "0400000001"])
        .output()
        .unwrap();
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("already in emergency list"));

    let listed = handsup(&storage)
        .args(["contacts", "list"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&listed.stdout).lines().count(), 1);
}

fn draft(name: &str, lat: f64, lon: f64, rating: i32) -> CampsiteDraft {
    let mut draft = CampsiteDraft::new(name, format!("{} Road, NSW", name), Coordinates::new(lat, lon));
    draft.rating = rating;
    draft
}

#[test]
fn test_campsites_persist_through_fjall() {
    let dir = TempDir::new().unwrap();
    let backend: Arc<dyn KeyValueStore> = Arc::new(FjallStore::open(dir.path()).unwrap());

    let mut store = CampsiteStore::open(backend.clone());
    let id = store.add(draft("Blue Mountains", -33.7128, 150.3119, 5)).id();
    store.add(draft("Jervis Bay", -35.1500, 150.6900, 4));
    assert!(store.persistence_error().is_none());

    let reopened = CampsiteStore::open(backend);
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get(id).unwrap().name, "Blue Mountains");
    assert_eq!(reopened.get(id).unwrap().rating(), 5);
}

#[test]
fn test_campsite_queries_compose() {
    let mut store = CampsiteStore::open(Arc::new(MemoryStore::new()));

    let mut national_park = draft("Kosciuszko", -36.4560, 148.2630, 4);
    national_park.category = CampsiteCategory::NationalPark;
    national_park.amenities.toilets = true;
    store.add(national_park);
    store.add(draft("Blue Mountains", -33.7128, 150.3119, 7));

    assert_eq!(store.search("").len(), 2);
    assert_eq!(store.search("kosci").len(), 1);
    assert_eq!(
        store
            .filter_by_category(Some(CampsiteCategory::NationalPark))
            .len(),
        1
    );

    let toilets = AmenityFilter {
        toilets: Some(true),
        ..AmenityFilter::default()
    };
    assert_eq!(store.filter_by_amenities(&toilets)[0].name, "Kosciuszko");

    let sydney = Coordinates::new(-33.8688, 151.2093);
    let nearby = store.nearby(&sydney, 100.0);
    assert_eq!(nearby.len(), 1);
    assert_eq!(nearby[0].rating(), 5);
}

/// Serves a fixed RSS document through the real parser
struct StaticRssFeed {
    xml: &'static str,
}

#[async_trait]
impl WarningFeed for StaticRssFeed {
    fn name(&self) -> &str {
        "static rss"
    }

    async fn fetch(&self) -> handsup::Result<Vec<EmergencyWarning>> {
        parse_feed(self.xml, "New South Wales", Utc::now())
    }
}

const NSW_FEED: &str = r#"<rss version="2.0" xmlns:georss="http://www.georss.org/georss">
  <channel>
    <title>NSW warnings</title>
    <item>
      <title>Severe Fire Weather Warning for Greater Sydney</title>
      <georss:point>-33.8688 151.2093</georss:point>
    </item>
    <item>
      <title>Flood Watch for Snowy Mountains</title>
      <georss:point>-36.4560 148.2630</georss:point>
    </item>
    <item>
      <title>Heatwave Warning for New South Wales</title>
    </item>
  </channel>
</rss>"#;

#[tokio::test]
async fn test_aggregator_over_parsed_feed() {
    let aggregator = WarningAggregator::new(
        vec![Box::new(StaticRssFeed { xml: NSW_FEED })],
        Duration::from_secs(5),
    );
    let snapshot = aggregator.refresh().await;
    assert_eq!(snapshot.warnings.len(), 3);
    assert!(snapshot.error.is_none());

    let katoomba = Coordinates::new(-33.7128, 150.3119);
    let near: Vec<WarningType> = aggregator
        .warnings_near(&katoomba, 100.0)
        .iter()
        .map(|w| w.warning_type)
        .collect();
    assert_eq!(near.len(), 2);
    assert!(near.contains(&WarningType::Fire));
    assert!(near.contains(&WarningType::Heatwave));

    let critical = aggregator.critical_warnings();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].severity, WarningSeverity::Severe);
}

#[tokio::test]
async fn test_broken_feed_keeps_last_good_snapshot() {
    struct Flaky {
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait]
    impl WarningFeed for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn fetch(&self) -> handsup::Result<Vec<EmergencyWarning>> {
            let call = self
                .calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call == 0 {
                parse_feed(NSW_FEED, "New South Wales", Utc::now())
            } else {
                parse_feed("<rss><channel><item>", "New South Wales", Utc::now())
            }
        }
    }

    let aggregator = WarningAggregator::new(
        vec![Box::new(Flaky {
            calls: std::sync::atomic::AtomicUsize::new(0),
        })],
        Duration::from_secs(5),
    );

    let good = aggregator.refresh().await;
    let after = aggregator.refresh().await;
    assert_eq!(after.warnings, good.warnings);
    assert!(after.error.is_some());

    let err = parse_feed("<rss><channel><item>", "NSW", Utc::now()).unwrap_err();
    assert!(matches!(err, HandsUpError::Parse { .. }));
}
