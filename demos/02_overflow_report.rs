/// overflow report - double billing, capping, and what could not be placed
///
/// a tenant billed twice for the same month gets capped at the monthly
/// rate; the excess moves into months with spare capacity, and whatever
/// fits nowhere is reported instead of silently dropped.
use rent_recognition_rs::{
    AllocationConfig, AmountValue, BillingDocument, DateValue, IssuedState, LifecycleStatus,
    PaymentState, RentRecognitionEngine, TenantDocument, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tenant_id = Uuid::new_v4();

    let tenants = vec![TenantDocument {
        id: tenant_id.to_string(),
        monthly_rate: Some(AmountValue::Number(3_500.0)),
        status: LifecycleStatus::Housed,
        company: None,
    }];

    let june_invoice = || BillingDocument {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        coverage_start: Some(DateValue::Text("2024-06-01".to_string())),
        coverage_end: Some(DateValue::Text("2024-06-30".to_string())),
        face_amount: Some(AmountValue::Number(3_500.0)),
        payment_state: PaymentState::Unpaid,
        issued_state: IssuedState::Issued,
    };

    // three invoices for the same month against a one-month window:
    // 10500 of demand, 3500 of capacity
    let records = vec![june_invoice(), june_invoice(), june_invoice()];

    let engine = RentRecognitionEngine::new(AllocationConfig::around(0, 0));
    let reference = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let outcome = engine.allocate(&tenants, &records, reference)?;

    println!("{}", outcome.to_json_pretty());

    for row in &outcome.overflow {
        println!(
            "unplaced: tenant {} month {} amount {}",
            row.tenant_id, row.month, row.amount
        );
    }

    Ok(())
}
