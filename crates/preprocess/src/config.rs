/// Side length of the square input the bundled model was trained on.
pub const DEFAULT_INPUT_SIZE: u32 = 500;
