mod corruption;
mod roundtrip;
mod utils;
