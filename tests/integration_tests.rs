//! Integration tests for pedigree-crawler
//!
//! These exercise the public API only: the crawler against the in-memory
//! mock store, and the crawler against a throwaway HTTP record server.

use pedigree_crawler::mock::generate_mock_pedigree_with_config;
use pedigree_crawler::{
    Crawler, Family, FamilyId, HttpFetcher, MockConfig, MockFetcher, MockPedigree, Person,
    PersonId, RecordFetcher, Strategy,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

fn crawler_for(fetcher: &Arc<MockFetcher>) -> Crawler {
    Crawler::new(Arc::clone(fetcher) as Arc<dyn RecordFetcher>)
}

fn http_crawler(base: String) -> Crawler {
    let http: Arc<dyn RecordFetcher> =
        Arc::new(HttpFetcher::new(base, Duration::from_secs(5)).unwrap());
    Crawler::new(http)
}

async fn mount_record(server: &MockServer, path: String, body: String) {
    Mock::given(matchers::method("GET"))
        .and(matchers::path(path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves `/family/{id}` and `/person/{id}` from a generated pedigree.
/// Unknown ids get an empty 200 body, as the real server does.
async fn serve_pedigree(pedigree: &MockPedigree) -> MockServer {
    let server = MockServer::start().await;
    for family in &pedigree.families {
        let body = serde_json::to_string(family).unwrap();
        mount_record(&server, format!("/family/{}", family.id.0), body).await;
    }
    for person in &pedigree.people {
        let body = serde_json::to_string(person).unwrap();
        mount_record(&server, format!("/person/{}", person.id.0), body).await;
    }

    Mock::given(matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .with_priority(u8::MAX)
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_documented_two_generation_scenario() {
    // F1: husband P1 (born into F2), wife P2; F2: P3 + P4, neither with parents
    let fetcher = Arc::new(
        MockFetcher::new()
            .with_family(Family::new(1).husband(1).wife(2))
            .with_family(Family::new(2).husband(3).wife(4))
            .with_person(Person::new(1).born_into(2))
            .with_person(Person::new(2))
            .with_person(Person::new(3))
            .with_person(Person::new(4)),
    );
    let crawler = crawler_for(&fetcher);

    let dfs = crawler.run_depth_first(FamilyId(1)).await;
    let bfs = crawler.run_breadth_first(FamilyId(1)).await;

    for snapshot in [&dfs, &bfs] {
        assert!(snapshot.success);
        assert_eq!(
            snapshot.tree.family_ids().into_iter().collect::<Vec<_>>(),
            vec![FamilyId(1), FamilyId(2)]
        );
        assert_eq!(
            snapshot.tree.person_ids().into_iter().collect::<Vec<_>>(),
            vec![PersonId(1), PersonId(2), PersonId(3), PersonId(4)]
        );
    }
    assert_eq!(fetcher.family_calls(FamilyId(3)).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_strategies_agree_across_seeds() {
    for seed in 0..8 {
        let pedigree = generate_mock_pedigree_with_config(MockConfig {
            generations: 5,
            max_children: 4,
            missing_probability: 0.15,
            cycle_probability: 0.3,
            seed: Some(seed),
        });
        let root = pedigree.root;

        let dfs_fetcher = Arc::new(pedigree.clone().into_fetcher().with_latency(0, 2));
        let bfs_fetcher = Arc::new(pedigree.into_fetcher().with_latency(0, 2));

        let dfs = crawler_for(&dfs_fetcher).run(Strategy::DepthFirst, root).await;
        let bfs = crawler_for(&bfs_fetcher).run(Strategy::BreadthFirst, root).await;

        assert!(dfs.tree.same_ids(&bfs.tree), "seed {} disagrees", seed);
        assert!(dfs_fetcher.max_calls_per_id().await <= 1, "seed {} refetched", seed);
        assert!(bfs_fetcher.max_calls_per_id().await <= 1, "seed {} refetched", seed);
    }
}

#[tokio::test]
async fn test_every_oldest_spouse_cycles_back_to_root() {
    let pedigree = generate_mock_pedigree_with_config(MockConfig {
        generations: 4,
        cycle_probability: 1.0,
        seed: Some(11),
        ..Default::default()
    });
    let fetcher = Arc::new(pedigree.into_fetcher());

    let snapshot = crawler_for(&fetcher).run_depth_first(FamilyId(1)).await;

    assert_eq!(snapshot.family_count(), 15);
    assert_eq!(fetcher.family_calls(FamilyId(1)).await, 1);
    assert!(snapshot.stats.revisits_skipped >= 16);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crawl_over_http() {
    let pedigree = generate_mock_pedigree_with_config(MockConfig {
        generations: 4,
        max_children: 2,
        missing_probability: 0.1,
        seed: Some(5),
        ..Default::default()
    });
    let server = serve_pedigree(&pedigree).await;

    let expected = {
        let fetcher = Arc::new(pedigree.clone().into_fetcher());
        crawler_for(&fetcher).run_breadth_first(pedigree.root).await.tree
    };

    let crawler = http_crawler(server.uri());

    let dfs = crawler.run_depth_first(pedigree.root).await;
    let bfs = crawler.run_breadth_first(pedigree.root).await;

    assert_eq!(dfs.tree, expected);
    assert_eq!(bfs.tree, expected);
}

#[tokio::test]
async fn test_unreachable_server_yields_empty_tree() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let snapshot = http_crawler(format!("http://{}", addr)).run_breadth_first(FamilyId(1)).await;

    assert!(snapshot.success);
    assert!(snapshot.tree.is_empty());
    assert_eq!(snapshot.stats.families_absent, 1);
}

#[tokio::test]
async fn test_record_served_under_wrong_id_is_not_recorded() {
    let server = MockServer::start().await;
    let family = Family::new(7).husband(10);
    mount_record(&server, "/family/5".to_string(), serde_json::to_string(&family).unwrap()).await;
    let person = Person::new(11).spouse_in(5);
    mount_record(&server, "/person/10".to_string(), serde_json::to_string(&person).unwrap()).await;

    let crawler = http_crawler(server.uri());
    for snapshot in [
        crawler.run_depth_first(FamilyId(5)).await,
        crawler.run_breadth_first(FamilyId(5)).await,
    ] {
        assert!(snapshot.tree.is_empty());
        assert!(!snapshot.tree.contains_family(FamilyId(7)));
        assert_eq!(snapshot.stats.families_absent, 1);
    }
}
