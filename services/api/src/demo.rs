use crate::infra::{demo_catalog, demo_employee, InMemoryWorkforceStore, PYTHON, RUST, SQL};
use clap::Args;
use internal_mobility::error::AppError;
use internal_mobility::workflows::requisition::{
    RequisitionDraft, RequisitionScanService, ScanResult, SkillId, SkillRequirement,
};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print each scan result as JSON instead of a summary line.
    #[arg(long)]
    pub(crate) json: bool,
}

type DemoService =
    RequisitionScanService<InMemoryWorkforceStore, InMemoryWorkforceStore, InMemoryWorkforceStore>;

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryWorkforceStore::seeded());
    let service: DemoService = RequisitionScanService::new(store.clone(), store.clone(), store);
    let names: BTreeMap<SkillId, String> = demo_catalog()
        .into_iter()
        .map(|skill| (skill.id, skill.name))
        .collect();

    println!("Requisition scan demo");

    let scenarios: [(&str, &[SkillId]); 3] = [
        ("Data Engineer", &[SQL, PYTHON]),
        ("Systems Engineer", &[RUST]),
        ("Operations Generalist", &[]),
    ];

    let mut first_id = None;
    for (role_title, skills) in scenarios {
        let requisition = service
            .submit(RequisitionDraft {
                manager_id: demo_employee(100),
                role_title: role_title.to_string(),
                department: Some("Technology".to_string()),
                required_skills: SkillRequirement::new(skills.iter().copied()),
            })
            .await?;
        first_id.get_or_insert(requisition.id);

        let required: Vec<&str> = skills
            .iter()
            .map(|skill| names.get(skill).map(String::as_str).unwrap_or("?"))
            .collect();
        println!(
            "\n{} (requisition {}) requires [{}]",
            role_title,
            requisition.id,
            required.join(", ")
        );

        let result = service.scan(requisition.id).await?;
        render_result(&result, args.json)?;
    }

    if let Some(id) = first_id {
        println!("\nRe-scanning requisition {id}");
        match service.scan(id).await {
            Ok(result) => render_result(&result, args.json)?,
            Err(err) => println!(
                "- rejected: {} (kind {}, retryable {})",
                err,
                err.kind().label(),
                err.is_retryable()
            ),
        }
    }

    let open = service.open_roles().await?;
    println!("\nInternal mobility board: {} open role(s)", open.len());
    for role in open {
        println!(
            "- {} | {} candidate(s) | skills {:?}",
            role.role_title,
            role.matched_employee_ids.len(),
            role.required_skills.iter().map(|id| id.0).collect::<Vec<_>>()
        );
    }

    Ok(())
}

fn render_result(result: &ScanResult, json: bool) -> Result<(), AppError> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!(
        "- status {} with {} internal candidate(s)",
        result.status,
        result.matched_employee_ids.len()
    );
    for candidate in &result.candidates {
        let depth: Vec<String> = candidate
            .skills
            .iter()
            .map(|held| format!("{}@{}", held.skill_id, held.proficiency.value()))
            .collect();
        println!("  - {} [{}]", candidate.employee_id, depth.join(", "));
    }
    Ok(())
}
