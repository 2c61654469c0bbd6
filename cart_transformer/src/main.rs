use free_sample::prelude::*;

mod input;

#[shopify_function]
fn run(input: input::Input) -> Result<FunctionRunResult> {
    let snapshot = input.cart.into_snapshot();
    log!("processing {} cart lines", snapshot.lines.len());

    let outcome = TransformOutcome::from_adjustments(price_adjustments_for(&snapshot));
    match &outcome {
        TransformOutcome::NoChanges => log!("no free sample lines"),
        TransformOutcome::Apply(operations) => {
            log!("pricing {} free sample lines at 0.00", operations.len())
        }
    }
    Ok(outcome.into())
}
