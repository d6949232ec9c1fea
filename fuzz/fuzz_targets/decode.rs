#![no_main]
use ld_pack::{decode, Options, StaticLoader};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let loader = StaticLoader::new();
    let _ = futures_executor::block_on(decode(data, &loader, &Options::default()));
});
