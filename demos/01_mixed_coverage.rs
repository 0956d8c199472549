/// mixed coverage - quarterly and ragged invoices spread across months
///
/// shows how coverage periods that ignore calendar boundaries still land
/// on the right months: full months get the rate, partial months get a
/// day-weighted share.
use rent_recognition_rs::{
    AmountValue, BillingDocument, DateValue, IssuedState, LifecycleStatus, PaymentState,
    RentRecognitionEngine, TenantDocument, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tenant_id = Uuid::new_v4();

    let tenants = vec![TenantDocument {
        id: tenant_id.to_string(),
        monthly_rate: Some(AmountValue::Number(3_100.0)),
        status: LifecycleStatus::Housed,
        company: None,
    }];

    let invoice = |start: &str, end: &str, face: f64, paid| BillingDocument {
        id: Uuid::new_v4().to_string(),
        tenant_id: tenant_id.to_string(),
        coverage_start: Some(DateValue::Text(start.to_string())),
        coverage_end: Some(DateValue::Text(end.to_string())),
        face_amount: Some(AmountValue::Number(face)),
        payment_state: if paid {
            PaymentState::Paid
        } else {
            PaymentState::Unpaid
        },
        issued_state: IssuedState::Issued,
    };

    let records = vec![
        // a paid quarterly invoice, april through june
        invoice("2024-04-01", "2024-06-30", 9_300.0, true),
        // a stay starting mid-july
        invoice("2024-07-17", "2024-09-30", 7_750.0, false),
    ];

    let engine = RentRecognitionEngine::with_defaults();
    let reference = chrono::NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let outcome = engine.allocate(&tenants, &records, reference)?;

    println!("month    recognized    paid       unpaid");
    for summary in &outcome.summaries {
        println!(
            "{}  {:>10}  {:>8}  {:>8}",
            summary.month, summary.total_recognized, summary.total_paid, summary.total_unpaid
        );
    }

    Ok(())
}
