#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;
use testcase_engine::Context;

#[derive(Arbitrary, Debug)]
struct Input {
    cwd: String,
    vars: Vec<(String, String)>,
    changed_key: String,
    changed_value: String,
}

fuzz_target!(|input: Input| {
    let env: BTreeMap<String, String> = input.vars.iter().cloned().collect();

    // Building the same map in reverse order must give an equal context
    let mut reversed = BTreeMap::new();
    for (k, v) in input.vars.iter().rev() {
        reversed.entry(k.clone()).or_insert_with(|| v.clone());
    }
    let a = Context::new(&input.cwd, env.clone());
    let b = Context::new(&input.cwd, reversed);
    assert_eq!(a, b);

    // Changing a single variable must make the contexts differ
    let mut changed = env.clone();
    let previous = changed.insert(input.changed_key.clone(), input.changed_value.clone());
    let c = Context::new(&input.cwd, changed);
    if previous.as_deref() == Some(input.changed_value.as_str()) {
        assert_eq!(a, c);
    } else {
        assert_ne!(a, c);
    }
});
