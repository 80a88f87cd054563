use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn cmd() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("tokenmeter").unwrap()
}

/// Helper: write a small pricing table into `dir` and return its path.
fn write_pricing(dir: &Path) -> PathBuf {
    let path = dir.join("pricing.json");
    std::fs::write(
        &path,
        r#"{
            "openai:gpt-4o-mini": {
                "vendor": "openai",
                "context": 128000,
                "input_per_1k": 0.15,
                "output_per_1k": 0.6,
                "tokenizer": "cl100k_base",
                "kind": "chat"
            },
            "openai:text-embedding-3-small": {
                "vendor": "openai",
                "input_per_1k": 0.02,
                "tokenizer": "cl100k_base",
                "kind": "embedding"
            },
            "anthropic:claude-3-5-sonnet": {
                "vendor": "anthropic",
                "context": 200000,
                "input_per_1k": 3.0,
                "output_per_1k": 15.0,
                "tokenizer": "anthropic_approx_bpe",
                "kind": "chat"
            },
            "tiny:model": {
                "vendor": "tiny",
                "context": 1000,
                "input_per_1k": 0.1,
                "output_per_1k": 0.1,
                "tokenizer": "cl100k_base",
                "kind": "chat"
            }
        }"#,
    )
    .unwrap();
    path
}

// -----------------------------------------------------------------------
// General CLI tests
// -----------------------------------------------------------------------

#[test]
fn help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("estimate"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("models"));
}

#[test]
fn missing_pricing_file_is_an_error() {
    cmd()
        .args(["models", "--pricing", "/nonexistent/pricing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

// -----------------------------------------------------------------------
// Models command tests
// -----------------------------------------------------------------------

#[test]
fn models_lists_pricing_table() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args(["models", "--pricing", pricing.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 models"))
        .stdout(predicate::str::contains("openai:gpt-4o-mini"))
        .stdout(predicate::str::contains("anthropic:claude-3-5-sonnet"));
}

#[test]
fn models_json_is_parseable() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    let output = cmd()
        .args(["models", "--json", "--pricing", pricing.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let models: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(models["openai:gpt-4o-mini"]["vendor"], "openai");
    assert_eq!(models["openai:text-embedding-3-small"]["kind"], "embedding");
}

#[test]
fn quiet_models_lists_bare_identifiers() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args(["-q", "models", "--pricing", pricing.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("openai:gpt-4o-mini"))
        .stdout(predicate::str::contains("4 models").not())
        .stdout(predicate::str::contains("vendor=").not());
}

#[test]
fn pricing_env_var_is_honored() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .arg("models")
        .env("TOKENMETER_PRICING", pricing.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("openai:gpt-4o-mini"));
}

#[test]
fn invalid_pricing_entry_names_the_model() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pricing.json");
    std::fs::write(
        &path,
        r#"{
            "bad:model": {
                "vendor": "acme",
                "input_per_1k": -1.0,
                "tokenizer": "cl100k_base",
                "kind": "chat"
            }
        }"#,
    )
    .unwrap();

    cmd()
        .args(["models", "--pricing", path.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad:model"))
        .stderr(predicate::str::contains("non-negative"));
}

// -----------------------------------------------------------------------
// Estimate command tests
// -----------------------------------------------------------------------

#[test]
fn estimate_basic_text_output() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args([
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "openai:gpt-4o-mini",
            "--system",
            "You are helpful.",
            "--user",
            "Summarize the article.",
            "--output-tokens",
            "250",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate for openai:gpt-4o-mini"))
        .stdout(predicate::str::contains("cl100k_base (exact)"))
        .stdout(predicate::str::contains("output tokens: 250"));
}

#[test]
fn estimate_json_has_full_breakdown() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    let output = cmd()
        .args([
            "estimate",
            "--json",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "openai:gpt-4o-mini",
            "--user",
            "Answer the question.",
            "--output-tokens",
            "100",
            "--embedding-tokens",
            "1000",
            "--vectors-read",
            "5",
            "--vector-read-fee",
            "0.01",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let estimate: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(estimate["model"], "openai:gpt-4o-mini");
    assert_eq!(estimate["output_tokens"], 100);
    assert!(estimate["input_tokens"].as_u64().unwrap() > 0);
    // 1000 embedding tokens at 0.02/1k; 5 vectors at a flat 0.01 each.
    let breakdown = &estimate["breakdown"];
    assert!((breakdown["embedding_cost"].as_f64().unwrap() - 0.02).abs() < 1e-9);
    assert!((breakdown["vector_io_cost"].as_f64().unwrap() - 0.05).abs() < 1e-9);
}

#[test]
fn estimate_unknown_model_fails() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args([
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "acme:gpt-99",
            "--user",
            "Test",
            "--output-tokens",
            "100",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown model: acme:gpt-99"));
}

#[test]
fn estimate_without_model_fails() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args([
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--user",
            "Test",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no model specified"));
}

#[test]
fn estimate_approximate_tokenizer_warns() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args([
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "anthropic:claude-3-5-sonnet",
            "--user",
            "Test prompt",
            "--output-tokens",
            "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("anthropic_approx_bpe (approximate)"))
        .stdout(predicate::str::contains("uses approximation"));
}

#[test]
fn estimate_high_context_utilization_warns() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    // No input text; 950 of 1000 context tokens from expected output alone.
    cmd()
        .args([
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "tiny:model",
            "--output-tokens",
            "950",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "High context utilization: 95.0% of 1,000 tokens",
        ));
}

#[test]
fn estimate_below_threshold_has_no_warning() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args([
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "tiny:model",
            "--output-tokens",
            "899",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("High context utilization").not());
}

#[test]
fn quiet_estimate_prints_cost_and_warnings_only() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args([
            "-q",
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "anthropic:claude-3-5-sonnet",
            "--user",
            "Test prompt",
            "--output-tokens",
            "100",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("$"))
        .stdout(predicate::str::contains("uses approximation"))
        .stdout(predicate::str::contains("Estimate for").not())
        .stdout(predicate::str::contains("input tokens").not());
}

#[test]
fn negative_vector_fee_is_rejected() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());

    cmd()
        .args([
            "estimate",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "openai:gpt-4o-mini",
            "--user",
            "Test",
            "--vectors-read",
            "5",
            "--vector-read-fee=-0.01",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid request"))
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn estimate_reads_user_prompt_from_file() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let prompt = dir.path().join("prompt.txt");
    std::fs::write(&prompt, "Summarize this document for me.").unwrap();

    let output = cmd()
        .args([
            "estimate",
            "--json",
            "--pricing",
            pricing.to_str().unwrap(),
            "--model",
            "openai:gpt-4o-mini",
            "--user-file",
            prompt.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let estimate: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(estimate["input_tokens"].as_u64().unwrap() > 0);
}

#[test]
fn default_model_comes_from_config_file() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let config = dir.path().join("tokenmeter.toml");
    std::fs::write(&config, "default_model = \"openai:gpt-4o-mini\"\n").unwrap();

    cmd()
        .args([
            "estimate",
            "--config",
            config.to_str().unwrap(),
            "--pricing",
            pricing.to_str().unwrap(),
            "--user",
            "hello",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Estimate for openai:gpt-4o-mini"));
}

// -----------------------------------------------------------------------
// Batch command tests
// -----------------------------------------------------------------------

#[test]
fn batch_aggregates_totals() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let batch_file = dir.path().join("requests.json");
    std::fs::write(
        &batch_file,
        r#"[
            {"model": "openai:gpt-4o-mini", "user": "First question", "expected_output_tokens": 100},
            {"model": "openai:gpt-4o-mini", "user": "Second question", "expected_output_tokens": 200}
        ]"#,
    )
    .unwrap();

    let output = cmd()
        .args([
            "batch",
            "--json",
            "--pricing",
            pricing.to_str().unwrap(),
            batch_file.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let batch: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(batch["results"].as_array().unwrap().len(), 2);
    assert_eq!(batch["total_output_tokens"], 300);
    assert!(batch["total_cost"].as_f64().unwrap() > 0.0);
    assert!(batch["total_input_tokens"].as_u64().unwrap() > 0);
}

#[test]
fn batch_preserves_request_order() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let batch_file = dir.path().join("requests.json");
    std::fs::write(
        &batch_file,
        r#"[
            {"model": "anthropic:claude-3-5-sonnet", "user": "a", "expected_output_tokens": 1},
            {"model": "openai:gpt-4o-mini", "user": "b", "expected_output_tokens": 2}
        ]"#,
    )
    .unwrap();

    let output = cmd()
        .args([
            "batch",
            "--json",
            "--pricing",
            pricing.to_str().unwrap(),
            batch_file.to_str().unwrap(),
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let batch: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let results = batch["results"].as_array().unwrap();
    assert_eq!(results[0]["model"], "anthropic:claude-3-5-sonnet");
    assert_eq!(results[1]["model"], "openai:gpt-4o-mini");
}

#[test]
fn batch_with_unknown_model_fails_whole_batch() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let batch_file = dir.path().join("requests.json");
    std::fs::write(
        &batch_file,
        r#"[
            {"model": "openai:gpt-4o-mini", "user": "fine", "expected_output_tokens": 100},
            {"model": "acme:gpt-99", "user": "broken", "expected_output_tokens": 100}
        ]"#,
    )
    .unwrap();

    cmd()
        .args([
            "batch",
            "--pricing",
            pricing.to_str().unwrap(),
            batch_file.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown model: acme:gpt-99"));
}

#[test]
fn quiet_batch_prints_totals_only() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let batch_file = dir.path().join("requests.json");
    std::fs::write(
        &batch_file,
        r#"[
            {"model": "openai:gpt-4o-mini", "user": "First question", "expected_output_tokens": 100}
        ]"#,
    )
    .unwrap();

    cmd()
        .args([
            "-q",
            "batch",
            "--pricing",
            pricing.to_str().unwrap(),
            batch_file.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Batch totals"))
        .stdout(predicate::str::contains("[1]").not())
        .stdout(predicate::str::contains("Estimate for").not());
}

#[test]
fn batch_with_negative_vector_fee_is_rejected() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let batch_file = dir.path().join("requests.json");
    std::fs::write(
        &batch_file,
        r#"[
            {
                "model": "openai:gpt-4o-mini",
                "user": "fine",
                "expected_output_tokens": 100,
                "rag": {"num_vectors_read": 5, "vector_read_fee_per_1k": -0.01}
            }
        ]"#,
    )
    .unwrap();

    cmd()
        .args([
            "batch",
            "--pricing",
            pricing.to_str().unwrap(),
            batch_file.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid request"))
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn batch_rejects_malformed_file() {
    let dir = tempdir().unwrap();
    let pricing = write_pricing(dir.path());
    let batch_file = dir.path().join("requests.json");
    std::fs::write(&batch_file, "{\"not\": \"an array\"}").unwrap();

    cmd()
        .args([
            "batch",
            "--pricing",
            pricing.to_str().unwrap(),
            batch_file.to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid batch file"));
}
