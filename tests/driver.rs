use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use futures::{future::BoxFuture, FutureExt};
use runtime_bench::{
    config::{RuntimeBenchmarkConfig, RuntimeDecl, SuiteClass, SuitePart, SuiteSpec},
    modes::{Operator, OperatorContext},
    runtimes::RuntimeResolver,
    Driver, DriverError, SingleBenchmarkResults,
};

mod common;

/// Operator recording every pair it is asked to run, failing on one suite name if configured to.
#[derive(Default)]
struct Recording {
    seen: Mutex<Vec<String>>,
    fail_on: Option<&'static str>,
}

impl Recording {
    fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

impl Operator for Recording {
    fn run<'a>(&'a self, context: &'a OperatorContext) -> BoxFuture<'a, anyhow::Result<SingleBenchmarkResults>> {
        async move {
            self.seen.lock().unwrap().push(context.identifier());
            if self.fail_on == Some(context.suite.name.as_str()) {
                anyhow::bail!("unexpected failure in {}", context.suite.name);
            }
            Ok(SingleBenchmarkResults {
                runtime: context.runtime.clone(),
                system: common::system(),
                suite: context.suite.clone(),
                total_ms: 1,
                bench: Some(serde_json::json!({"benchmarks": []})),
                error: None,
            })
        }
        .boxed()
    }
}

fn driver() -> Driver {
    Driver::with_resolver(RuntimeResolver::with_lookup(|bin| {
        Some(PathBuf::from("/usr/local/bin").join(bin))
    }))
}

fn config(runtimes: &[&str], suites: Vec<SuiteSpec>) -> RuntimeBenchmarkConfig {
    RuntimeBenchmarkConfig {
        runtimes: runtimes.iter().map(|name| RuntimeDecl::from(*name)).collect(),
        suites,
    }
}

fn targeted(path: &str, runtimes: &[&str]) -> SuiteSpec {
    SuiteSpec::Tuple(vec![
        SuitePart::Path(path.to_string()),
        SuitePart::Class(SuiteClass {
            runtimes: Some(runtimes.iter().map(ToString::to_string).collect()),
            ..Default::default()
        }),
    ])
}

#[tokio::test]
async fn no_runtimes_fails_before_running_anything() {
    let operator = Recording::default();

    let err = driver()
        .execute_suite(&operator, &config(&[], vec![SuiteSpec::from("a.mjs")]))
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<DriverError>(), Some(DriverError::NoRuntimes)));
    assert!(operator.seen().is_empty());
}

#[tokio::test]
async fn no_suites_fails_before_running_anything() {
    let operator = Recording::default();

    let err = driver()
        .execute_suite(&operator, &config(&["node"], vec![]))
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<DriverError>(), Some(DriverError::NoSuites)));
    assert!(operator.seen().is_empty());
}

#[tokio::test]
async fn results_are_ordered_suite_major_runtime_minor() {
    let operator = Recording::default();

    let results = driver()
        .execute_suite(
            &operator,
            &config(&["r1", "r2"], vec![SuiteSpec::from("a.mjs"), SuiteSpec::from("b.mjs")]),
        )
        .await
        .unwrap();

    let order: Vec<String> = results
        .all
        .iter()
        .map(|result| format!("{}/{}", result.runtime.name, result.suite.name))
        .collect();
    assert_eq!(order, vec!["r1/a.mjs", "r2/a.mjs", "r1/b.mjs", "r2/b.mjs"]);
    assert_eq!(operator.seen(), order);
    assert_eq!(results.all[0].runtime.resolved, "/usr/local/bin/r1");
}

#[tokio::test]
async fn suites_run_only_on_their_listed_runtimes() {
    let operator = Recording::default();

    let results = driver()
        .execute_suite(
            &operator,
            &config(
                &["node", "deno", "bun"],
                vec![targeted("a.mjs", &["bun", "node"]), SuiteSpec::from("b.mjs")],
            ),
        )
        .await
        .unwrap();

    assert_eq!(
        operator.seen(),
        vec!["bun/a.mjs", "node/a.mjs", "node/b.mjs", "deno/b.mjs", "bun/b.mjs"]
    );
    assert_eq!(results.all.len(), 5);
}

#[tokio::test]
async fn unconfigured_runtime_aborts_the_batch() {
    let operator = Recording::default();

    let err = driver()
        .execute_suite(
            &operator,
            &config(&["node"], vec![SuiteSpec::from("a.mjs"), targeted("b.mjs", &["node", "bun"])]),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DriverError>(),
        Some(DriverError::UnknownRuntime(name)) if name == "bun"
    ));
    assert_eq!(operator.seen(), vec!["node/a.mjs", "node/b.mjs"]);
}

#[tokio::test]
async fn malformed_suite_entries_are_configuration_errors() {
    let operator = Recording::default();
    let malformed = SuiteSpec::Tuple(vec![
        SuitePart::Path("a.mjs".to_string()),
        SuitePart::Path("b.mjs".to_string()),
    ]);

    let err = driver()
        .execute_suite(&operator, &config(&["node"], vec![SuiteSpec::from("ok.mjs"), malformed]))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<DriverError>(),
        Some(DriverError::InvalidSuiteEntry(1))
    ));
}

#[tokio::test]
async fn operator_errors_abort_the_batch() {
    let operator = Recording {
        fail_on: Some("b.mjs"),
        ..Default::default()
    };

    let err = driver()
        .execute_suite(
            &operator,
            &config(
                &["node"],
                vec![SuiteSpec::from("a.mjs"), SuiteSpec::from("b.mjs"), SuiteSpec::from("c.mjs")],
            ),
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "unexpected failure in b.mjs");
    assert_eq!(operator.seen(), vec!["node/a.mjs", "node/b.mjs"]);
}

#[tokio::test]
async fn runtimes_are_resolved_once_per_driver() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let mut driver = Driver::with_resolver(RuntimeResolver::with_lookup({
        let lookups = lookups.clone();
        move |_| {
            lookups.fetch_add(1, Ordering::SeqCst);
            None
        }
    }));
    let operator = Recording::default();
    let config = config(&["node", "node"], vec![SuiteSpec::from("a.mjs")]);

    driver.execute_suite(&operator, &config).await.unwrap();
    driver.execute_suite(&operator, &config).await.unwrap();

    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn suite_paths_resolve_against_the_working_directory() {
    let operator = Recording::default();

    let results = driver()
        .execute_suite(&operator, &config(&["node"], vec![SuiteSpec::from("bench/./x.mjs")]))
        .await
        .unwrap();

    let suite = &results.all[0].suite;
    assert_eq!(suite.resolved, std::env::current_dir().unwrap().join("bench/x.mjs"));
    assert_eq!(suite.name, "x.mjs");
    assert!(Path::new(&suite.resolved).is_absolute());
}
