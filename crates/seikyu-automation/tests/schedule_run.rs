use pretty_assertions::assert_eq;
use seikyu_automation::{stamp_draft, RunContext, RunError};
use seikyu_model::{InvoiceDraft, ScheduleDoc};

fn schedule() -> ScheduleDoc {
    serde_json::from_str(
        r#"{
            "name": "monthly retainer",
            "templateDraftId": "draft-1",
            "nextRunDate": "2026-04-01",
            "active": true,
            "rules": [
                { "pattern": "<<DUE>>", "template": "{{NEXT_YYYY}}-{{NEXT_MM}}-10" }
            ],
            "fieldTemplates": {
                "subjectTemplate": "{{BLOCK_1}} ({{BLOCK_2}})",
                "noteTemplate": "請求日 {{BLOCK_RUN_DATE}} / 月末 {{BLOCK_RUN_EOM}}",
                "itemNameTemplates": ["{{BLOCK_2}} 作業費"]
            },
            "blockKeys": ["BLOCK_1", "BLOCK_2"],
            "blockRows": [
                {
                    "runDate": "2026-04-01",
                    "values": { "BLOCK_1": "コンサル業務", "BLOCK_2": "{{MONTH_LABEL}}" }
                },
                {
                    "runDate": "2026-05-01",
                    "values": { "BLOCK_1": "=COPYUP()", "BLOCK_2": "{{MONTH_LABEL}}" }
                }
            ]
        }"#,
    )
    .unwrap()
}

fn template_draft() -> InvoiceDraft {
    serde_json::from_str(
        r#"{
            "clientId": "client-9",
            "issueDate": "2026-03-01",
            "dueDate": "<<DUE>>",
            "invoiceNo": "INV-0099",
            "subject": "(unused: field template wins)",
            "issuerId": "issuer-2",
            "items": [
                { "id": "a", "name": "作業費", "qty": 2, "unit": "式", "unitPrice": 50000, "taxRate": 10 },
                { "id": "b", "name": "交通費", "qty": 1, "unit": "式", "unitPrice": 1080, "taxRate": 8 }
            ],
            "notes": "毎度ありがとうございます。",
            "bankAccountIds": ["bank-1", "bank-2"]
        }"#,
    )
    .unwrap()
}

fn run_ctx(run_date: &str) -> RunContext<'_> {
    RunContext {
        schedule_id: "sched-1",
        template_draft_id: "draft-1",
        run_date,
    }
}

#[test]
fn stamps_fields_through_blocks_then_rules() {
    let draft = stamp_draft(&schedule(), &template_draft(), &run_ctx("2026-04-01")).unwrap();

    assert_eq!(draft.subject, "コンサル業務 (2026年4月分)");
    assert_eq!(draft.notes, "請求日 2026-04-01 / 月末 2026-04-30");
    // Item 0 takes its name template; item 1 has none and keeps its own name.
    assert_eq!(draft.items[0].name, "2026年4月分 作業費");
    assert_eq!(draft.items[1].name, "交通費");
    // The rule pass rewrote the due-date marker against the run date.
    assert_eq!(draft.due_date.as_deref(), Some("2026-05-10"));
    assert_eq!(draft.issue_date, "2026-04-01");
    assert_eq!(draft.invoice_no, "");
}

#[test]
fn recomputes_amounts_and_totals() {
    let draft = stamp_draft(&schedule(), &template_draft(), &run_ctx("2026-04-01")).unwrap();

    assert_eq!(draft.items[0].amount, 100000);
    assert_eq!(draft.items[1].amount, 1080);
    assert_eq!(draft.sub_total, 101080);
    // floor(100000 * 0.10) + floor(1080 * 0.08) = 10000 + 86.
    assert_eq!(draft.tax_total, 10086);
    assert_eq!(draft.grand_total, 111166);
}

#[test]
fn records_provenance_and_carries_references() {
    let draft = stamp_draft(&schedule(), &template_draft(), &run_ctx("2026-04-01")).unwrap();

    assert_eq!(draft.source_draft_id.as_deref(), Some("draft-1"));
    assert_eq!(draft.generated_by_schedule_id.as_deref(), Some("sched-1"));
    assert_eq!(draft.client_id.as_deref(), Some("client-9"));
    assert_eq!(draft.issuer_id.as_deref(), Some("issuer-2"));
    assert_eq!(draft.bank_account_ids, ["bank-1", "bank-2"]);
}

#[test]
fn copyup_rows_stamp_like_the_editor_preview() {
    // The May row copies BLOCK_1 from April through the row fold.
    let draft = stamp_draft(&schedule(), &template_draft(), &run_ctx("2026-05-01")).unwrap();
    assert_eq!(draft.subject, "コンサル業務 (2026年5月分)");
    assert_eq!(draft.items[0].name, "2026年5月分 作業費");
}

#[test]
fn missing_block_row_still_gets_run_pseudo_blocks() {
    let draft = stamp_draft(&schedule(), &template_draft(), &run_ctx("2026-07-15")).unwrap();
    // No configured row for July: numbered blocks blank out, pseudo-blocks
    // still resolve.
    assert_eq!(draft.subject, " ()");
    assert_eq!(draft.notes, "請求日 2026-07-15 / 月末 2026-07-31");
}

#[test]
fn inactive_schedules_do_not_run() {
    let mut inactive = schedule();
    inactive.active = false;
    assert_eq!(
        stamp_draft(&inactive, &template_draft(), &run_ctx("2026-04-01")),
        Err(RunError::Inactive)
    );
}

#[test]
fn mismatched_template_draft_is_rejected() {
    let ctx = RunContext {
        schedule_id: "sched-1",
        template_draft_id: "draft-2",
        run_date: "2026-04-01",
    };
    assert_eq!(
        stamp_draft(&schedule(), &template_draft(), &ctx),
        Err(RunError::TemplateMismatch {
            expected: "draft-1".to_string(),
            got: "draft-2".to_string(),
        })
    );
}
