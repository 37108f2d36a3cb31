/// Points for clearing `lines` rows with a single lock: `10 * lines^2`.
pub fn line_clear_points(lines: usize) -> u32 {
    let k = lines as u32;
    k.saturating_mul(k).saturating_mul(10)
}
