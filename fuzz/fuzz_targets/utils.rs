/// Inputs are capped to keep pathological constant pools from exhausting
/// memory.
pub const MAX_INPUT_SIZE: usize = 256 * 1024;
