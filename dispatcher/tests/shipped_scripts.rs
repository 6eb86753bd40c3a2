//! The regression scripts shipped under `scripts/` must stay discoverable.

use std::path::Path;

use dispatcher::io::catalog::discover_scripts;

#[test]
fn shipped_scripts_carry_headers() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../scripts");
    let scripts = discover_scripts(&dir).expect("discover scripts");

    let names: Vec<&str> = scripts.iter().map(|s| s.header.name.as_str()).collect();
    assert_eq!(names, vec!["mxs585.py", "mxs598.py"]);

    for script in &scripts {
        let file_name = script.path.file_name().expect("file name");
        assert_eq!(file_name.to_string_lossy(), script.header.name);
        assert!(!script.header.steps.is_empty(), "{} has no steps", script.header.name);
    }
    assert_eq!(
        scripts[1].header.steps,
        vec![
            "use SSL for Maxscale client connection",
            "simple transactions in the loop"
        ]
    );
}
