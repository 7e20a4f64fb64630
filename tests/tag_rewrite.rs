use wheelwright::python::MINIMUM_STABLE_ABI;
use wheelwright::{RuntimeFamily, TagTriple, WheelTagRewriter};

const PLATFORMS: &[&str] = &[
    "linux_x86_64",
    "manylinux2014_aarch64",
    "macosx_11_0_arm64",
    "win_amd64",
    "any",
];

#[test]
fn every_cpython_minor_collapses_to_the_minimum() {
    let rewriter = WheelTagRewriter::default();
    for minor in 8..=14 {
        for platform in PLATFORMS {
            let tag = format!("cp3{minor}");
            let rewritten = rewriter.rewrite(TagTriple::new(&tag, &tag, platform));
            assert_eq!(rewritten.interpreter, "cp38");
            assert_eq!(rewritten.abi, "abi3");
            assert_eq!(rewritten.platform, *platform, "platform must pass through");
        }
    }
}

#[test]
fn rewriting_is_idempotent() {
    let rewriter = WheelTagRewriter::default();
    for triple in [
        TagTriple::new("cp312", "cp312", "linux_x86_64"),
        TagTriple::new("pp310", "pypy310_pp73", "win_amd64"),
        TagTriple::pure(),
    ] {
        let once = rewriter.rewrite(triple);
        assert_eq!(rewriter.rewrite(once.clone()), once);
    }
}

#[test]
fn non_cpython_families_are_unchanged() {
    let rewriter = WheelTagRewriter::default();
    for triple in [
        TagTriple::new("pp39", "pypy39_pp73", "linux_x86_64"),
        TagTriple::new("gp311", "graalpy242_311_native", "linux_x86_64"),
        TagTriple::new("ip27", "none", "any"),
        TagTriple::new("jy27", "none", "any"),
        TagTriple::new("py3", "none", "any"),
    ] {
        assert_ne!(
            RuntimeFamily::from_interpreter_tag(&triple.interpreter),
            RuntimeFamily::CPython
        );
        assert_eq!(rewriter.rewrite(triple.clone()), triple);
    }
}

#[test]
fn minimum_matches_the_limited_api_macro() {
    assert_eq!(MINIMUM_STABLE_ABI.limited_api_hex(), "0x03080000");
    assert_eq!(
        WheelTagRewriter::default().stable_interpreter_tag(),
        format!("cp{}", MINIMUM_STABLE_ABI.tag_digits())
    );
}

#[test]
fn parsed_tags_round_trip_through_the_rewriter() {
    let triple: TagTriple = "cp311-cp311-macosx_10_9_x86_64".parse().unwrap();
    assert_eq!(
        WheelTagRewriter::default().rewrite(triple).to_string(),
        "cp38-abi3-macosx_10_9_x86_64"
    );
}
