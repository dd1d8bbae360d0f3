use threadgate_core::{Bucket, Comment, Thread, ThreadgateError, DEFAULT_MARKER};
use threadgate_review::analyzer::{Analyzer, ThreadSource};
use threadgate_review::partition::classify;

struct Fixture(Vec<Thread>);

impl ThreadSource for Fixture {
    async fn fetch_threads(
        &self,
        _owner: &str,
        _repo: &str,
        _pr_number: u64,
    ) -> Result<Vec<Thread>, ThreadgateError> {
        Ok(self.0.clone())
    }
}

fn thread(id: &str, is_resolved: bool, is_outdated: bool, first_body: &str) -> Thread {
    let comment = |n: usize, body: &str| Comment {
        id: format!("{id}-{n}"),
        body: body.into(),
        author: if n == 0 { "coderabbitai" } else { "dev" }.into(),
        created_at: "2024-05-01T12:00:00Z".parse().unwrap(),
        path: "src/main.rs".into(),
        line: (!is_outdated).then_some(10),
        position: (!is_outdated).then_some(5),
        outdated: is_outdated,
        url: format!("https://github.com/acme/widgets/pull/9#discussion_{id}_{n}"),
    };
    Thread {
        id: id.into(),
        is_resolved,
        is_outdated,
        resolved_by: is_resolved.then(|| "dev".to_string()),
        comments: vec![comment(0, first_body), comment(1, "done")],
    }
}

const HIGH: &str = "This is an auto-generated comment by OSS CodeRabbit [severity:high] fix X";
const LOW: &str = "This is an auto-generated comment by OSS CodeRabbit [severity:low] fix X";

async fn analyze(threads: Vec<Thread>) -> bool {
    Analyzer::new(Fixture(threads), DEFAULT_MARKER)
        .analyze("acme", "widgets", 9)
        .await
        .unwrap()
}

#[tokio::test]
async fn scenario_a_resolved_without_change_blocks() {
    let classification = classify(vec![thread("a", true, false, HIGH)], DEFAULT_MARKER);
    assert_eq!(classification.threads(Bucket::ResolvedAndNotOutdated).len(), 1);
    assert_eq!(classification.status_of("a-0"), Some(Bucket::ResolvedAndNotOutdated));
    assert_eq!(classification.status_of("a-1"), Some(Bucket::ResolvedAndNotOutdated));

    assert!(analyze(vec![thread("a", true, false, HIGH)]).await);
}

#[tokio::test]
async fn scenario_b_open_on_changed_code_does_not_block() {
    let classification = classify(vec![thread("b", false, true, HIGH)], DEFAULT_MARKER);
    assert_eq!(classification.threads(Bucket::UnresolvedAndOutdated).len(), 1);
    assert_eq!(classification.len(), 1);

    assert!(!analyze(vec![thread("b", false, true, HIGH)]).await);
}

#[tokio::test]
async fn scenario_c_low_severity_is_excluded() {
    let classification = classify(vec![thread("c", true, true, LOW)], DEFAULT_MARKER);
    assert!(classification.is_empty());
    assert_eq!(classification.status_of("c-0"), None);

    assert!(!analyze(vec![thread("c", true, true, LOW)]).await);
}

#[tokio::test]
async fn scenario_d_one_outstanding_thread_suffices() {
    let threads = vec![thread("d1", true, true, HIGH), thread("d2", false, false, HIGH)];
    let classification = classify(threads.clone(), DEFAULT_MARKER);
    assert_eq!(classification.threads(Bucket::ResolvedAndOutdated).len(), 1);
    assert_eq!(classification.threads(Bucket::UnresolvedAndNotOutdated).len(), 1);

    assert!(analyze(threads).await);
}

#[tokio::test]
async fn scenario_e_no_threads() {
    let classification = classify(Vec::new(), DEFAULT_MARKER);
    for bucket in Bucket::ALL {
        assert!(classification.threads(bucket).is_empty());
    }

    assert!(!analyze(Vec::new()).await);
}

#[tokio::test]
async fn human_threads_never_block() {
    let human = "[severity:high] I think this leaks a file handle";
    assert!(!analyze(vec![thread("h", false, false, human)]).await);
}

#[tokio::test]
async fn mixed_case_severity_blocks() {
    let body = "This is an auto-generated comment by OSS CodeRabbit [Severity:HIGH]";
    assert!(analyze(vec![thread("m", false, false, body)]).await);
}
