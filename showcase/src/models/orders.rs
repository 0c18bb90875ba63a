use anyhow::{anyhow, bail};
use rsfn_runtime::StageResult;

/// Raw order line, parsed quantity, priced total, printed receipt.
///
/// rsfn: pipeline
#[allow(dead_code)]
pub struct OrderFlow(String, u32, f64, String);

include!(concat!(env!("OUT_DIR"), "/order_flow_pipeline_gen.rs"));

pub const UNIT_PRICE: f64 = 2.5;

pub fn parse_quantity(line: String) -> StageResult<u32> {
    line.trim().parse::<u32>().map_err(|e| anyhow!("bad quantity {:?}: {}", line, e))
}

pub fn price(quantity: u32) -> StageResult<f64> {
    if quantity == 0 {
        bail!("empty order");
    }
    Ok(f64::from(quantity) * UNIT_PRICE)
}

pub fn receipt(total: f64) -> StageResult<String> {
    Ok(format!("total: {:.2}", total))
}
