//! Dependency graph over loaded schemas

use jadn::graph::{build_deps, cycles, roots, topo_sort};
use pretty_assertions::assert_eq;

fn load(text: &str) -> jadn::Schema {
    jadn::loads("jidl", text).unwrap()
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_music_library_order() {
    let text = include_str!("fixtures/music.jidl");
    let schema = load(text);
    let deps = build_deps(&schema);

    assert_eq!(deps["Library"], names(&["Barcode", "Album"]));
    assert_eq!(deps["Album"], names(&["Artist", "Publication", "Track", "Image"]));
    assert_eq!(deps["TrackInfo"], names(&["Artist", "Genre"]));
    assert!(deps["ImageFormat"].is_empty());

    let r = roots(&deps);
    assert_eq!(r, names(&["Library"]));
    assert_eq!(
        topo_sort(&deps, &r),
        names(&[
            "Library",
            "Barcode",
            "Album",
            "Artist",
            "Instrument",
            "Publication",
            "Track",
            "TrackInfo",
            "Genre",
            "Audio",
            "Image",
            "ImageFormat",
        ])
    );
    assert!(cycles(&deps).is_empty());
}

#[test]
fn test_chain_and_fan_out() {
    let chain = load("A = Record\n   1 b B\n\nB = Record\n   1 c C\n\nC = String\n");
    let deps = build_deps(&chain);
    assert_eq!(topo_sort(&deps, &roots(&deps)), names(&["A", "B", "C"]));

    let fan = load("A = Record\n   1 b B\n   2 c C\n\nC = String\n\nB = String\n");
    let deps = build_deps(&fan);
    assert_eq!(topo_sort(&deps, &roots(&deps)), names(&["A", "B", "C"]));
}

#[test]
fn test_mutual_reference_falls_back_to_declaration_order() {
    let schema = load("B = Record\n   1 a A\n\nA = Record\n   1 b B\n");
    let deps = build_deps(&schema);
    let r = roots(&deps);
    assert!(r.is_empty());
    assert_eq!(topo_sort(&deps, &r), names(&["B", "A"]));
    assert_eq!(cycles(&deps), vec![names(&["B", "A"])]);
}

#[test]
fn test_derived_and_option_references() {
    let schema = load(
        "Keys = MapOf(Enum[Rec], Pointer[Rec]){1..*}\n\nRec = Record\n   1 tags ArrayOf(Tag)\n\nTag = String\n",
    );
    let deps = build_deps(&schema);
    assert_eq!(deps["Keys"], names(&["Rec", "Rec"]));
    assert_eq!(deps["Rec"], names(&["Tag"]));
    assert_eq!(roots(&deps), names(&["Keys"]));
}
