use std::path::Path;

use super::harness::{MockIndex, TestContext, parse_json, write_file};

pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&TestContext) -> Result<(), String>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "closure_text",
            run: scenario_closure_text,
        },
        Scenario {
            name: "closure_json",
            run: scenario_closure_json,
        },
        Scenario {
            name: "outdated_against_index",
            run: scenario_outdated,
        },
        Scenario {
            name: "outdated_skips_unsupported_registry",
            run: scenario_outdated_unsupported,
        },
        Scenario {
            name: "licenses_bundle",
            run: scenario_licenses_bundle,
        },
        Scenario {
            name: "licenses_strict_failure",
            run: scenario_licenses_strict,
        },
        Scenario {
            name: "prune_members",
            run: scenario_prune,
        },
    ]
}

const REGISTRY: &str = "registry+https://github.com/rust-lang/crates.io-index";

fn write_lockfile(dir: &Path, content: &str) -> Result<(), String> {
    write_file(&dir.join("Cargo.lock"), content)
}

fn scenario_closure_text(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("closure-text")?;
    write_lockfile(
        &env.root,
        &format!(
            r#"
[[package]]
name = "hub"
version = "0.4.0"
dependencies = ["hub-core"]

[[package]]
name = "hub-core"
version = "0.4.0"
dependencies = ["serde"]

[[package]]
name = "tiles"
version = "0.2.0"
dependencies = ["syn"]

[[package]]
name = "serde"
version = "1.0.200"
source = "{REGISTRY}"
dependencies = ["serde_derive"]

[[package]]
name = "serde_derive"
version = "1.0.200"
source = "{REGISTRY}"

[[package]]
name = "syn"
version = "2.0.60"
source = "{REGISTRY}"
"#
        ),
    )?;

    let out = ctx.run_lockaudit(&env, &["closure", "hub"], &env.root)?;
    out.assert_success()?;
    out.assert_stdout_contains("hub 0.4.0")?;
    out.assert_stdout_contains("hub-core 0.4.0")?;
    out.assert_stdout_contains("serde 1.0.200")?;
    out.assert_stdout_contains("serde_derive 1.0.200")?;
    // Only reachable from the other component
    out.assert_stdout_not_contains("syn")?;
    out.assert_stdout_not_contains("tiles")
}

fn scenario_closure_json(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("closure-json")?;
    write_lockfile(
        &env.root,
        &format!(
            r#"
[[package]]
name = "hub"
version = "0.4.0"
dependencies = ["serde"]

[[package]]
name = "serde"
version = "1.0.200"
source = "{REGISTRY}"
"#
        ),
    )?;

    let out = ctx.run_lockaudit(&env, &["--json", "closure", "hub"], &env.root)?;
    out.assert_success()?;
    let value = parse_json(&out.stdout)?;
    if value["component"] != "hub" {
        return Err(format!("Unexpected component: {}", value["component"]));
    }
    let packages = value["packages"]
        .as_array()
        .ok_or("packages is not an array")?;
    if packages.len() != 2 || packages[1]["name"] != "serde" {
        return Err(format!("Unexpected packages: {:?}", packages));
    }
    Ok(())
}

fn scenario_outdated(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("outdated")?;
    let index = MockIndex::serve(&[
        (
            "/se/rd/serde",
            "{\"vers\":\"1.0.200\"}\n{\"vers\":\"1.0.210\"}",
        ),
        ("/to/ki/tokio", "{\"vers\":\"1.38.0\"}"),
    ])?;
    write_file(
        &env.xdg_config.join("lockaudit").join("config.json"),
        &format!("{{\"registry_index\": \"{}\"}}", index.base_url),
    )?;

    write_lockfile(
        &env.root,
        &format!(
            r#"
[[package]]
name = "hub-core"
version = "0.4.0"
dependencies = [
    "serde 1.0.200",
    "tokio",
]

[[package]]
name = "serde"
version = "1.0.200"
source = "{REGISTRY}"

[[package]]
name = "tokio"
version = "1.38.0"
source = "{REGISTRY}"
"#
        ),
    )?;

    let out = ctx.run_lockaudit(&env, &["outdated"], &env.root)?;
    out.assert_success()?;
    out.assert_stdout_contains("serde: 1.0.200 => 1.0.210")?;
    out.assert_stdout_contains("  required by hub-core")?;
    out.assert_stdout_not_contains("tokio")
}

fn scenario_outdated_unsupported(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("outdated-unsupported")?;
    let index = MockIndex::serve(&[(
        "/se/rd/serde",
        "{\"vers\":\"1.0.210\"}",
    )])?;
    write_file(
        &env.xdg_config.join("lockaudit").join("config.json"),
        &format!("{{\"registry_index\": \"{}\"}}", index.base_url),
    )?;

    write_lockfile(
        &env.root,
        &format!(
            r#"
[[package]]
name = "hub-core"
version = "0.4.0"
dependencies = [
    "patched",
    "serde",
]

[[package]]
name = "patched"
version = "0.1.0"
source = "git+https://example.com/patched.git"

[[package]]
name = "serde"
version = "1.0.200"
source = "{REGISTRY}"
"#
        ),
    )?;

    let out = ctx.run_lockaudit(&env, &["outdated"], &env.root)?;
    // The unsupported registry is skipped with a warning; the audit continues
    out.assert_success()?;
    out.assert_stderr_contains("warning:")?;
    out.assert_stderr_contains("patched")?;
    out.assert_stdout_contains("serde: 1.0.200 => 1.0.210")
}

fn scenario_licenses_bundle(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("licenses")?;
    let vendor = env.root.join("vendor").join("mini-0.5.0");
    write_file(
        &vendor.join("Cargo.toml"),
        "[package]\nname = \"mini\"\nversion = \"0.5.0\"\nrepository = \"https://example.com/mini\"\n",
    )?;
    write_file(&vendor.join("LICENSE-MIT"), "mini mit license text\n")?;
    write_file(&vendor.join("LICENSE-APACHE"), "mini apache license text\n")?;

    write_lockfile(
        &env.root,
        &format!(
            r#"
[[package]]
name = "hub-core"
version = "0.4.0"
dependencies = ["mini"]

[[package]]
name = "mini"
version = "0.5.0"
source = "{REGISTRY}"
license = "MIT OR Apache-2.0"
manifest_path = "{manifest}"
"#,
            manifest = vendor.join("Cargo.toml").display(),
        ),
    )?;

    let out = ctx.run_lockaudit(&env, &["licenses", "hub", "--strict"], &env.root)?;
    out.assert_success()?;
    out.assert_stdout_contains("Crate: mini@0.5.0")?;
    out.assert_stdout_contains("Repository: https://example.com/mini")?;
    out.assert_stdout_contains("License: MIT OR Apache-2.0")?;
    out.assert_stdout_contains(" mini mit license text")?;
    out.assert_stdout_contains(" mini apache license text")?;
    // The local package itself is not bundled
    out.assert_stdout_not_contains("Crate: hub-core")
}

fn scenario_licenses_strict(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("licenses-strict")?;
    let vendor = env.root.join("vendor").join("mini-0.5.0");
    write_file(
        &vendor.join("Cargo.toml"),
        "[package]\nname = \"mini\"\nversion = \"0.5.0\"\n",
    )?;

    write_lockfile(
        &env.root,
        &format!(
            r#"
[[package]]
name = "hub-core"
version = "0.4.0"
dependencies = ["mini"]

[[package]]
name = "mini"
version = "0.5.0"
source = "{REGISTRY}"
license = "MIT"
manifest_path = "{manifest}"
"#,
            manifest = vendor.join("Cargo.toml").display(),
        ),
    )?;

    let strict = ctx.run_lockaudit(&env, &["licenses", "hub", "--strict"], &env.root)?;
    strict.assert_failure()?;
    strict.assert_stderr_contains("mini")?;
    strict.assert_stderr_contains("MIT")?;

    let lax = ctx.run_lockaudit(&env, &["licenses", "hub"], &env.root)?;
    lax.assert_success()?;
    lax.assert_stdout_contains("# no license text available for MIT")
}

fn scenario_prune(ctx: &TestContext) -> Result<(), String> {
    let env = ctx.create_env("prune")?;
    write_file(
        &env.root.join("Cargo.toml"),
        r#"
[workspace]
members = [
    "hub",
    "hub-ftp",
    "tiles",
    "lib/foo",
]
"#,
    )?;

    let out = ctx.run_lockaudit(
        &env,
        &["prune", "hub", "--keep-lib", "foo"],
        &env.root,
    )?;
    out.assert_success()?;
    out.assert_stdout_contains("tiles")?;
    out.assert_stdout_not_contains("hub")?;
    out.assert_stdout_not_contains("lib/foo")?;

    let json = ctx.run_lockaudit(
        &env,
        &["--json", "prune", "hub", "--keep-lib", "foo"],
        &env.root,
    )?;
    json.assert_success()?;
    let value = parse_json(&json.stdout)?;
    let kept = value["kept"].as_array().ok_or("kept is not an array")?;
    let removed = value["removed"].as_array().ok_or("removed is not an array")?;
    if kept.len() != 3 || removed.len() != 1 || removed[0] != "tiles" {
        return Err(format!("Unexpected partition: {}", json.stdout));
    }
    Ok(())
}
