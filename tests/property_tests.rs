//! Property-based tests for version handling and metadata sync.
//!
//! These tests use proptest to verify invariants hold across
//! randomly generated inputs.

use proptest::prelude::*;

use bmk::core::initconf::patch_version;
use bmk::core::manifest::Manifest;
use bmk::core::package_name::derive_package_name;
use bmk::core::version::{replace_version_line, BumpPart, Version};

/// Strategy for identifier-like segments.
fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}"
}

/// Strategy for distribution names with dashes.
fn dist_name() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..4).prop_map(|parts| parts.join("-"))
}

fn version_string() -> impl Strategy<Value = String> {
    (0u64..1000, 0u64..1000, 0u64..1000).prop_map(|(a, b, c)| format!("{}.{}.{}", a, b, c))
}

proptest! {
    #[test]
    fn version_display_parses_back(major in 0u64..100_000, minor in 0u64..100_000, patch in 0u64..100_000) {
        let v = Version::new(major, minor, patch);
        prop_assert_eq!(v.to_string().parse::<Version>().unwrap(), v);
    }

    #[test]
    fn bump_is_strictly_increasing(v in version_string()) {
        let v: Version = v.parse().unwrap();
        for part in [BumpPart::Major, BumpPart::Minor, BumpPart::Patch] {
            prop_assert!(v.bump(part).unwrap() > v);
        }
    }

    #[test]
    fn bump_resets_lower_parts(v in version_string()) {
        let v: Version = v.parse().unwrap();
        prop_assert_eq!(v.bump(BumpPart::Major).unwrap(), Version::new(v.major + 1, 0, 0));
        prop_assert_eq!(v.bump(BumpPart::Minor).unwrap(), Version::new(v.major, v.minor + 1, 0));
        prop_assert_eq!(v.bump(BumpPart::Patch).unwrap(), Version::new(v.major, v.minor, v.patch + 1));
    }

    #[test]
    fn non_numeric_versions_are_rejected(s in "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{0,2}[a-z+-][a-z0-9]{0,4}") {
        prop_assert!(s.parse::<Version>().is_err());
    }

    #[test]
    fn patch_is_idempotent(old in version_string(), new in version_string(), before in "[a-z_ =\"\n]{0,40}") {
        let content = format!("{}\nversion = \"{}\"\ntitle = \"x\"\n", before, old);
        let once = patch_version(&content, &new);
        prop_assert_eq!(patch_version(&once, &new), once.clone());
    }

    #[test]
    fn patch_touches_only_the_version_line(old in version_string(), new in version_string()) {
        let content = format!("name = \"pkg\"\nversion = \"{}\"\nurl = \"https://example.invalid\"\n", old);
        let patched = patch_version(&content, &new);
        let expected = format!("name = \"pkg\"\nversion = \"{}\"\nurl = \"https://example.invalid\"\n", new);
        prop_assert_eq!(patched, expected);
    }

    #[test]
    fn manifest_version_replacement_keeps_other_lines(old in version_string(), new in version_string()) {
        let content = format!("[project]\nname = \"x\"\nversion = \"{}\"\n\n[tool.other]\nkey = 1\n", old);
        let replaced = replace_version_line(&content, &old, &new).unwrap();
        let expected_line = format!("version = \"{}\"", new);
        prop_assert!(replaced.contains(&expected_line));
        prop_assert!(replaced.ends_with("[tool.other]\nkey = 1\n"));
    }

    #[test]
    fn name_fallback_replaces_dashes(name in dist_name()) {
        let manifest = Manifest::parse(&format!("[project]\nname = \"{}\"\n", name)).unwrap();
        let derived = derive_package_name(&manifest).unwrap();
        prop_assert_eq!(derived, name.replace('-', "_"));
    }

    #[test]
    fn wheel_packages_beat_scripts(pkg in segment(), module in segment(), name in dist_name()) {
        let text = format!(
            "[project]\nname = \"{}\"\n\n[project.scripts]\ncli = \"{}.main:run\"\n\n[tool.hatch.build.targets.wheel]\npackages = [\"src/{}\"]\n",
            name, module, pkg
        );
        let manifest = Manifest::parse(&text).unwrap();
        prop_assert_eq!(derive_package_name(&manifest).unwrap(), pkg);
    }

    #[test]
    fn script_target_takes_first_module_segment(module in segment(), sub in segment(), name in dist_name()) {
        let text = format!(
            "[project]\nname = \"{}\"\n\n[project.scripts]\ncli = \"{}.{}:main\"\n",
            name, module, sub
        );
        let manifest = Manifest::parse(&text).unwrap();
        prop_assert_eq!(derive_package_name(&manifest).unwrap(), module);
    }
}
