/// Random identifier for a run, used to correlate its log lines.
pub fn longid() -> String {
    nanoid::nanoid!()
}
