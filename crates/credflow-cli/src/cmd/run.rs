//! `credflow run`: one full issuance session.

use super::{block_on, exit_code, interruptible};
use crate::cli::RunArgs;
use crate::ui;
use credflow_kernel::coordinator::{SessionPlan, SessionReport};
use credflow_kernel::ExchangeCoordinator;
use credflow_types::command::split_list;
use credflow_types::config::ControllerConfig;
use credflow_types::ledger::SchemaSpec;
use rand::Rng;

pub fn cmd_run(config: &ControllerConfig, args: RunArgs) -> i32 {
    let random_tag = rand::thread_rng().gen_range(0..=1_000_000u32);
    let plan = plan_from(config, args, random_tag);

    ui::section("Credential issuance");
    ui::kv("Issuer", &format!("{} ({})", config.issuer.ident, config.issuer.admin_url));
    ui::kv("Holder", &format!("{} ({})", config.holder.ident, config.holder.admin_url));
    ui::kv(
        "Schema",
        &format!(
            "{} {} [{}]",
            plan.schema.name,
            plan.schema.version,
            plan.schema.attributes.join(", ")
        ),
    );
    ui::kv("Tag", &plan.cred_def_tag);

    block_on(async move {
        let mut coordinator = ExchangeCoordinator::from_config(config);
        ui::kv("Run", &coordinator.run_id().to_string());
        ui::blank();

        let outcome = interruptible(coordinator.run(&plan)).await.and_then(|r| r);
        coordinator.close().await;

        match outcome {
            Ok(report) => {
                print_report(&report);
                0
            }
            Err(e) => {
                ui::error(&e.to_string());
                exit_code(&e)
            }
        }
    })
}

/// Build the session plan from config, overridden by command-line flags.
fn plan_from(config: &ControllerConfig, args: RunArgs, random_tag: u32) -> SessionPlan {
    let schema = SchemaSpec {
        name: args.schema_name.unwrap_or_else(|| config.schema.name.clone()),
        version: args
            .schema_version
            .unwrap_or_else(|| config.schema.version.clone()),
        attributes: args
            .schema_attrs
            .map(|raw| split_list(&raw))
            .filter(|attrs| !attrs.is_empty())
            .unwrap_or_else(|| config.schema.attributes.clone()),
    };
    let tag = args.tag.unwrap_or_else(|| random_tag.to_string());

    let mut plan = SessionPlan::new(schema, tag);
    plan.register_dids = !args.skip_did;
    plan
}

fn print_report(report: &SessionReport) {
    ui::success("Credential issued");
    ui::kv("Issuer DID", report.issuer_did.as_deref().unwrap_or("-"));
    ui::kv("Holder DID", report.holder_did.as_deref().unwrap_or("-"));
    ui::kv("Issuer conn", &report.connection.issuer_connection_id);
    ui::kv("Holder conn", &report.connection.holder_connection_id);
    ui::kv("Schema id", &report.artifacts.schema_id);
    ui::kv("Cred def id", &report.artifacts.cred_def_id);
    ui::kv_ok("Thread id", &report.credential.thread_id);
    ui::kv(
        "Elapsed",
        &format!(
            "{} ms",
            (report.finished_at - report.started_at).num_milliseconds()
        ),
    );
}
