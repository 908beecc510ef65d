use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SAMPLE_KEY: &str = "35230612345678901234550010000012341000012345";
const PROVIDER_KEY: &str = "42250485179240000239550020004175361171503396";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../nfex-core/fixtures")
        .join(name)
}

fn nfex(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("nfex").unwrap();
    // Keep the user's own config file out of the way.
    cmd.env("XDG_CONFIG_HOME", config_dir.path())
        .env("HOME", config_dir.path())
        .env_remove("NFEX_PROVIDER_SECRET");
    cmd
}

#[test]
fn extract_sample_as_json() {
    let home = TempDir::new().unwrap();
    let output = nfex(&home)
        .arg("extract")
        .arg(fixture("nfe_sample.xml"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["chave_nota_fiscal"], SAMPLE_KEY);
    assert_eq!(record["numero_nota"], "000001234");
    assert_eq!(record["serie_nota"], "1");
    assert_eq!(record["valor_nota_fiscal"], "1050.00");
    assert_eq!(record["peso_bruto"], "110.000");
    assert_eq!(record["quantidade_volumes"], "10");
    assert_eq!(record["numero_pedido"], "12345");
    assert!(record.get("volumes").is_none());
}

#[test]
fn extract_with_volumes() {
    let home = TempDir::new().unwrap();
    let output = nfex(&home)
        .args(["extract", "--volumes"])
        .arg(fixture("nfe_sample.xml"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let volumes = record["volumes"].as_array().unwrap();
    assert_eq!(volumes.len(), 10);
    assert_eq!(volumes[0]["index"], 1);
    assert_eq!(volumes[9]["index"], 10);
    assert_eq!(volumes[0]["weight_kg"], "11.00");
}

#[test]
fn extract_csv_and_text_formats() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["extract", "--format", "csv"])
        .arg(fixture("nfe_sample.xml"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("chave_nota_fiscal,numero_nota"))
        .stdout(predicate::str::contains(format!("{},000001234,1,", SAMPLE_KEY)));

    nfex(&home)
        .args(["extract", "-f", "text"])
        .arg(fixture("nfe_sample.xml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("NFe: 000001234"))
        .stdout(predicate::str::contains("Total:    R$ 1.050,00"))
        .stdout(predicate::str::contains("Order: 12345"));
}

#[test]
fn extract_writes_output_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("record.xml");

    nfex(&home)
        .args(["extract", "-f", "xml", "-o"])
        .arg(&out)
        .arg(fixture("nfe_sample.xml"))
        .assert()
        .success();

    let xml = fs::read_to_string(&out).unwrap();
    assert!(xml.contains("<notaFiscal>"));
    assert!(xml.contains("<numero_nota>000001234</numero_nota>"));
}

#[test]
fn extract_reports_validation_warnings() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["extract", "--validate"])
        .arg(fixture("nfe_sample.xml"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Validation issues:"))
        .stderr(predicate::str::contains("Access key check digit does not match"));
}

#[test]
fn extract_rejects_malformed_key() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["extract", "--key", "12345"])
        .arg(fixture("nfe_sample.xml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid access key '12345'"));
}

#[test]
fn extract_missing_file() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["extract", "does-not-exist.xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_provider_json() {
    let home = TempDir::new().unwrap();
    let output = nfex(&home)
        .arg("extract")
        .arg(fixture("nfe_provider.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["chave_nota_fiscal"], PROVIDER_KEY);
    assert_eq!(record["valor_nota_fiscal"], "950.00");
    assert_eq!(record["quantidade_volumes"], "1");
}

#[test]
fn batch_continues_past_failures() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("in");
    let out = home.path().join("out");
    fs::create_dir_all(&input).unwrap();
    fs::copy(fixture("nfe_sample.xml"), input.join("sample.xml")).unwrap();
    fs::copy(fixture("nfe_provider.json"), input.join("provider.json")).unwrap();
    fs::write(input.join("broken.json"), r#"{"status":"unknown"}"#).unwrap();
    fs::write(input.join("notes.txt"), "ignored").unwrap();

    nfex(&home)
        .arg("batch")
        .arg(format!("{}/*", input.display()))
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error", "--volumes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processed 3 files"))
        .stdout(predicate::str::contains("broken.json"));

    assert!(out.join("sample.json").exists());
    assert!(out.join("provider.json").exists());
    assert!(!out.join("broken.json").exists());

    let sample: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("sample.json")).unwrap()).unwrap();
    assert_eq!(sample["volumes"].as_array().unwrap().len(), 10);

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,chave_nota_fiscal"));
    assert_eq!(summary.lines().count(), 4);
    assert!(summary.contains("broken.json,error"));
    assert!(summary.contains("structure not recognized"));
    assert!(summary.contains(&format!("sample.xml,success,{}", SAMPLE_KEY)));
}

#[test]
fn batch_stops_on_first_failure() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("broken.xml"), "<nfeProc><NFe></nfeProc>").unwrap();

    nfex(&home)
        .arg("batch")
        .arg(format!("{}/*.xml", home.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn batch_without_matches() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .arg("batch")
        .arg(format!("{}/*.xml", home.path().display()))
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn key_decodes_components() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["key", PROVIDER_KEY])
        .assert()
        .success()
        .stdout(predicate::str::contains("4225 0485 1792"))
        .stdout(predicate::str::contains("Issuer:        85.179.240/0002-39"))
        .stdout(predicate::str::contains("Number:        000417536"))
        .stdout(predicate::str::contains("valid"));

    let output = nfex(&home)
        .args(["key", "--json", "3523 0612 3456 7890 1234 5500 1000 0012 3410 0001 2345"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let decoded: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(decoded["key"], SAMPLE_KEY);
    assert_eq!(decoded["model"], "55");
    assert_eq!(decoded["check_digit_valid"], false);
}

#[test]
fn key_rejects_short_input() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["key", "3523"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected exactly 44 digits"));
}

#[test]
fn config_init_get_set() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("nfex.json");

    nfex(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    nfex(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    nfex(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "provider.max_attempts", "5"])
        .assert()
        .success();

    nfex(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "provider.max_attempts"])
        .assert()
        .success()
        .stdout(predicate::str::diff("5\n"));

    nfex(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "provider.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));

    nfex(&home)
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "volumes.height_cm", "oops"])
        .assert()
        .failure();
}

#[test]
fn config_path_uses_config_dir() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nfex/config.json"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn fetch_rejects_invalid_key_without_network() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["fetch", "123"])
        .env("NFEX_PROVIDER_SECRET", "secret")
        .assert()
        .failure()
        .stderr(predicate::str::contains("exactly 44 digits"));
}

#[test]
fn fetch_requires_credentials() {
    let home = TempDir::new().unwrap();

    nfex(&home)
        .args(["fetch", PROVIDER_KEY])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is not configured"));
}

#[test]
fn fetch_from_provider() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();

    let token = server
        .mock("POST", "/auth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"token":"tok-9"}"#)
        .expect(1)
        .create();
    let document = server
        .mock("GET", format!("/requests/nfe/{}", PROVIDER_KEY).as_str())
        .match_header("authorization", "Bearer tok-9")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(fs::read_to_string(fixture("nfe_provider.json")).unwrap())
        .expect(1)
        .create();

    let config = home.path().join("nfex.json");
    let settings = serde_json::json!({
        "provider": {
            "base_url": server.url(),
            "client_id": "client",
            "base_delay_ms": 0,
            "jitter_ms": 0
        }
    });
    fs::write(&config, settings.to_string()).unwrap();
    let xml_out = home.path().join("nota.xml");

    let output = nfex(&home)
        .arg("-c")
        .arg(&config)
        .args(["fetch", PROVIDER_KEY, "--volumes", "--xml-out"])
        .arg(&xml_out)
        .env("NFEX_PROVIDER_SECRET", "secret")
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    token.assert();
    document.assert();

    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["chave_nota_fiscal"], PROVIDER_KEY);
    assert_eq!(record["volumes"].as_array().unwrap().len(), 1);
    assert_eq!(record["volumes"][0]["weight_kg"], "42.50");

    let xml = fs::read_to_string(&xml_out).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<nfeProc>"));
}
