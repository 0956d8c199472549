/// quick start - allocate one tenant's rent across the analysis window
use rent_recognition_rs::{
    AmountValue, BillingDocument, DateValue, IssuedState, LifecycleStatus, PaymentState,
    RentMetrics, RentRecognitionEngine, TenantDocument, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tenant_id = Uuid::new_v4();

    // a housed tenant paying 3500 a month
    let tenants = vec![TenantDocument {
        id: tenant_id.to_string(),
        monthly_rate: Some(AmountValue::Text("3500".to_string())),
        status: LifecycleStatus::Housed,
        company: Some("Acme Housing BV".to_string()),
    }];

    // one paid invoice covering june exactly
    let records = vec![BillingDocument {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        coverage_start: Some(DateValue::Text("2024-06-01".to_string())),
        coverage_end: Some(DateValue::Text("2024-06-30".to_string())),
        face_amount: Some(AmountValue::Number(3_500.0)),
        payment_state: PaymentState::Paid,
        issued_state: IssuedState::Issued,
    }];

    let engine = RentRecognitionEngine::with_defaults();
    let reference = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let outcome = engine.allocate(&tenants, &records, reference)?;

    // current-month dashboard snapshot
    let metrics = RentMetrics::current(&outcome);
    println!("month:        {}", metrics.month);
    println!("receivable:   {}", metrics.total_receivable);
    println!("invoiced:     {}", metrics.invoiced);
    println!("received:     {}", metrics.received);
    println!("outstanding:  {}", metrics.outstanding);
    println!("collection:   {}", metrics.collection_rate);

    Ok(())
}
