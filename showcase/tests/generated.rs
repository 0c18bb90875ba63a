//! Behavior of the code generated into OUT_DIR for the showcase models

use anyhow::anyhow;
use rsfn_runtime::{Pattern, RuntimeError, StageResult};
use showcase::models::geometry::{Shape, ShapeMatcher, ShapeValueMatcher};
use showcase::models::math::{
    answer_curried, div_rem, div_rem_curried, greet, greet_curried, join_with, join_with_curried, scale,
    scale_curried, volume, volume_curried,
};
use showcase::models::orders::{
    order_flow_composer, order_flow_composer_with_handler, order_flow_fallback,
    order_flow_log_and_propagate, parse_quantity, price, receipt,
};
use showcase::models::people::{new_person, PersonRecord};
use showcase::models::rules::{Launch, LaunchOption, Rule, RuleMatcher, RuleValueMatcher};
use showcase::models::server::{ServerConfig, ServerConfigOption};
use std::cell::RefCell;

// Curried

#[test]
fn curried_call_matches_direct_call() {
    for (l, w, h) in [(1, 2, 3), (4, 5, 6), (0, 9, 9)] {
        assert_eq!(volume_curried()(l)(w)(h), volume(l, w, h));
    }
}

#[test]
fn partial_applications_are_reusable() {
    let base = volume_curried()(2)(3);
    assert_eq!(base(1), 6);
    assert_eq!(base(10), 60);

    let by_two = volume_curried()(2);
    assert_eq!(by_two(5)(5), 50);
    assert_eq!(by_two(1)(1), 2);
}

#[test]
fn variadic_argument_is_forwarded_element_wise() {
    let parts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let curried = join_with_curried()(", ".to_string())(parts.clone());
    assert_eq!(curried, join_with(", ".to_string(), parts));
    assert_eq!(curried, "a, b, c");

    let dashed = join_with_curried()("-".to_string());
    assert_eq!(dashed(Vec::new()), "");
    assert_eq!(dashed(vec!["only".to_string()]), "only");
    assert_eq!(dashed(vec!["x".to_string(), "y".to_string()]), "x-y");
}

#[test]
fn single_trailing_argument_matches_direct_call() {
    let one = vec!["solo".to_string()];
    assert_eq!(join_with_curried()("+".to_string())(one.clone()), join_with("+".to_string(), one));
}

#[test]
fn borrowed_first_parameter_is_curried() {
    assert_eq!(greet_curried()("world")(2), greet("world", 2));

    let owned = String::from("ada");
    let greet_ada = greet_curried()(&owned);
    assert_eq!(greet_ada(1), "hello ada");
    assert_eq!(greet_ada(3), greet(owned.as_str(), 3));
    assert_eq!(greet_ada(0), "");
}

#[test]
fn parameter_named_like_the_function_still_calls_it() {
    for (factor, value) in [(2.0, 3.5), (-1.0, 4.0), (0.5, 0.0)] {
        assert_eq!(scale_curried()(factor)(value), scale(factor, value));
    }
    let double = scale_curried()(2.0);
    assert_eq!(double(21.0), 42.0);
}

#[test]
fn multiple_results_come_back_as_the_tuple() {
    assert_eq!(div_rem_curried()(17)(5), (3, 2));
    assert_eq!(div_rem_curried()(17)(5), div_rem(17, 5));
}

#[test]
fn zero_parameters_call_through() {
    assert_eq!(answer_curried(), 42);
}

// Record

#[test]
fn record_accessors_return_constructor_arguments() {
    let person = new_person("Ada".to_string(), 36, vec!["ada@example.com".to_string()]);
    assert_eq!(person.name(), "Ada");
    assert_eq!(*person.age(), 36);
    assert_eq!(person.emails(), &["ada@example.com".to_string()]);
}

#[test]
fn record_is_usable_through_the_trait() {
    fn describe(record: &impl PersonRecord) -> String {
        format!("{} ({})", record.name(), record.age())
    }
    assert_eq!(describe(&new_person("Grace".into(), 45, Vec::new())), "Grace (45)");
}

// Optional

#[test]
fn options_start_from_defaults() {
    let config = ServerConfig::with_options(Vec::<ServerConfigOption>::new());
    assert_eq!(
        config,
        ServerConfig { host: String::new(), port: 0, workers: 0, tls: false }
    );
}

#[test]
fn later_options_win() {
    let config = ServerConfig::with_options([
        ServerConfig::with_port(80),
        ServerConfig::with_tls(true),
        ServerConfig::with_port(443),
    ]);
    assert_eq!(config.port, 443);
    assert!(config.tls);
    assert_eq!(config.workers, 0);

    let local = ServerConfig::local([ServerConfig::with_workers(16)]);
    assert_eq!(local.host, "127.0.0.1");
    assert_eq!(local.port, 8080);
    assert_eq!(local.workers, 16);
}

#[test]
fn field_named_options_keeps_both_constructors() {
    let launch = Launch::with_options([
        Launch::with_options_field(vec!["--fast".to_string()]),
        Launch::with_retries(3),
    ]);
    assert_eq!(launch, Launch { options: vec!["--fast".to_string()], retries: 3 });
    assert_eq!(Launch::with_options(Vec::<LaunchOption>::new()), Launch { options: Vec::new(), retries: 0 });
}

// Pipeline

#[test]
fn composer_runs_every_stage() {
    let flow = order_flow_composer(parse_quantity, price, receipt);
    assert_eq!(flow(" 4 ".to_string()).unwrap(), "total: 10.00");
}

#[test]
fn composer_stops_at_first_failure() {
    let later_stage_runs = RefCell::new(0);
    let counting_receipt = |total: f64| -> StageResult<String> {
        *later_stage_runs.borrow_mut() += 1;
        receipt(total)
    };
    let flow = order_flow_composer(parse_quantity, price, counting_receipt);

    let err = flow("0".to_string()).unwrap_err();
    assert_eq!(err.to_string(), "empty order");
    assert!(flow("lots".to_string()).is_err());
    assert_eq!(*later_stage_runs.borrow(), 0);
}

#[test]
fn handler_sees_failing_stage_index() {
    let failed_at = RefCell::new(Vec::new());
    let flow = order_flow_composer_with_handler(parse_quantity, price, receipt, |stage, error| {
        failed_at.borrow_mut().push(stage);
        Err(error)
    });

    assert!(flow("x".to_string()).is_err());
    assert!(flow("0".to_string()).is_err());
    assert!(flow("2".to_string()).is_ok());
    assert_eq!(*failed_at.borrow(), vec![1, 2]);
}

#[test]
fn handler_result_replaces_pipeline_result() {
    let broken_receipt = |_: f64| -> StageResult<String> { Err(anyhow!("printer jam")) };
    let flow = order_flow_composer_with_handler(
        parse_quantity,
        price,
        broken_receipt,
        order_flow_fallback("no receipt".to_string()),
    );
    assert_eq!(flow("3".to_string()).unwrap(), "no receipt");

    let flow = order_flow_composer_with_handler(
        parse_quantity,
        price,
        broken_receipt,
        order_flow_log_and_propagate(),
    );
    assert_eq!(flow("3".to_string()).unwrap_err().to_string(), "printer jam");
}

#[test]
fn stage_errors_keep_their_type() {
    let cancelled = |_: u32| -> StageResult<f64> { Err(RuntimeError::Cancelled.into()) };
    let flow = order_flow_composer(parse_quantity, cancelled, receipt);
    let err = flow("1".to_string()).unwrap_err();
    assert_eq!(err.downcast_ref::<RuntimeError>(), Some(&RuntimeError::Cancelled));
}

// Match

#[test]
fn first_matching_clause_wins() {
    let square = Shape::new("square", 4, true);
    let hits = RefCell::new(Vec::new());

    let matcher = ShapeMatcher::new(&square)
        .when(Pattern::Exact("circle".to_string()), Pattern::Wildcard, Pattern::Wildcard, |_| {
            hits.borrow_mut().push("circle")
        })
        .when(Pattern::Wildcard, Pattern::Exact(4), Pattern::Wildcard, |_| hits.borrow_mut().push("four sides"))
        .when(Pattern::Exact("square".to_string()), Pattern::Wildcard, Pattern::Wildcard, |_| {
            hits.borrow_mut().push("square")
        });
    assert!(matcher.is_matched());
    matcher.default(|_| hits.borrow_mut().push("default"));

    assert_eq!(*hits.borrow(), vec!["four sides"]);
}

#[test]
fn default_runs_only_without_a_match() {
    let triangle = Shape::new("triangle", 3, false);
    let hit = RefCell::new(None);
    ShapeMatcher::new(&triangle)
        .when(Pattern::Wildcard, Pattern::Exact(4), Pattern::Wildcard, |_| *hit.borrow_mut() = Some("quad"))
        .default(|shape| *hit.borrow_mut() = Some(if shape.filled { "filled" } else { "outline" }));
    assert_eq!(*hit.borrow(), Some("outline"));
}

#[test]
fn absent_pattern_never_matches() {
    let shape = Shape::new("square", 4, true);
    let name = ShapeValueMatcher::new(&shape)
        .when(Pattern::Absent, Pattern::Wildcard, Pattern::Wildcard, "never")
        .when(Pattern::Wildcard, Pattern::Wildcard, Pattern::Wildcard, "anything")
        .default("none");
    assert_eq!(name, "anything");
}

#[test]
fn guard_must_hold_for_the_clause() {
    let shape = Shape::new("hexagon", 6, false);
    let label = ShapeValueMatcher::new(&shape)
        .when_guard(Pattern::Wildcard, Pattern::Wildcard, Pattern::Wildcard, |s| s.sides > 8, "many")
        .when_guard(Pattern::Wildcard, Pattern::Wildcard, Pattern::Exact(false), |s| s.sides > 4, "hollow")
        .default("other");
    assert_eq!(label, "hollow");
}

#[test]
fn value_matcher_computes_and_defaults() {
    let circle = Shape::new("circle", 0, true);
    let sides = ShapeValueMatcher::new(&circle)
        .when_with(Pattern::Exact("circle".to_string()), Pattern::Wildcard, Pattern::Wildcard, |s| s.kind.len() as u32)
        .result();
    assert_eq!(sides, Some(6));

    let blob = Shape::new("blob", 1, false);
    let fallback = ShapeValueMatcher::new(&blob)
        .when(Pattern::Exact("circle".to_string()), Pattern::Wildcard, Pattern::Wildcard, 0)
        .default_with(|s| s.sides * 100);
    assert_eq!(fallback, 100);
    assert_eq!(
        ShapeValueMatcher::<u8>::new(&blob).when(Pattern::Absent, Pattern::Absent, Pattern::Absent, 1).result(),
        None
    );
}

#[test]
fn fields_named_like_clause_arguments_are_matchable() {
    let rule = Rule { action: "deny".to_string(), value: 7, guard: true };
    let hit = RefCell::new(None);
    RuleMatcher::new(&rule)
        .when(Pattern::Exact("allow".to_string()), Pattern::Wildcard, Pattern::Wildcard, |_| {
            *hit.borrow_mut() = Some("allow")
        })
        .when_guard(Pattern::Exact("deny".to_string()), Pattern::Wildcard, Pattern::Exact(true), |r| r.value > 5, |_| {
            *hit.borrow_mut() = Some("deny above five")
        })
        .default(|_| *hit.borrow_mut() = Some("default"));
    assert_eq!(*hit.borrow(), Some("deny above five"));

    let score = RuleValueMatcher::new(&rule)
        .when(Pattern::Wildcard, Pattern::Exact(1), Pattern::Wildcard, 1)
        .when_with(Pattern::Wildcard, Pattern::Wildcard, Pattern::Exact(true), |r| r.value * 10)
        .default(0);
    assert_eq!(score, 70);
}
