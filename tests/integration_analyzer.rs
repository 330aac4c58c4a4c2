use ngdeps::core::DependencyAnalyzer;
use ngdeps::error::ExtractError;
use ngdeps::extract::{AnnotationFilter, DependencyRecord, Extractor};
use std::fs;
use std::path::Path;

const APP: &str = r#"
import {Component, View, provide} from 'angular2/core';

@Component({
    selector: 'app',
    directives: ['a/b/Foo', Bar],
    providers: [provide(Token1, {useClass: Impl}), Token2],
    templateUrl: 'app/app.component.html'
})
export class AppComponent {}
"#;

const TWICE: &str = r#"
@Component({selector: 'x', providers: [A]})
@View({providers: [B], templateUrl: []})
export class Twice {}
"#;

const BAD: &str = "@Component({ providers: {x: 1} })\nclass Bad {}\n";

const PLAIN: &str = "export class Util {}\nexport function helper() {}\n";

fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

fn write_project(root: &Path, with_bad: bool) {
    fs::write(root.join("a_app.ts"), APP).unwrap();
    fs::write(root.join("b_twice.ts"), TWICE).unwrap();
    if with_bad {
        fs::write(root.join("c_bad.ts"), BAD).unwrap();
    }
    fs::write(root.join("d_plain.ts"), PLAIN).unwrap();
    fs::write(
        root.join("types.d.ts"),
        "@Component({providers: [Ghost]}) declare class Ghost {}\n",
    )
    .unwrap();
}

fn analyzer() -> DependencyAnalyzer {
    DependencyAnalyzer::new_with_cache(Extractor::default(), None)
}

#[test]
fn analyzer_extracts_normalized_records_in_order() {
    let dir = tempfile::TempDir::new().unwrap();
    write_project(dir.path(), false);

    let report = analyzer().analyze(&[dir.path().to_path_buf()]).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.files_analyzed, 3);

    let names: Vec<_> = report.records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["AppComponent", "Twice", "Twice"]);

    let app = &report.records[0];
    assert_eq!(app.file, dir.path().join("a_app.ts"));
    assert_eq!(app.directives, strings(&["Foo", "Bar"]));
    assert_eq!(app.providers, strings(&["Token1*", "Token2"]));
    assert_eq!(app.template_url, strings(&["app.component.html"]));

    // One record per matching annotation, each with its own categories.
    let component = &report.records[1];
    assert_eq!(component.directives, None);
    assert_eq!(component.providers, strings(&["A"]));
    assert_eq!(component.template_url, None);

    let view = &report.records[2];
    assert_eq!(view.providers, strings(&["B"]));
    assert_eq!(view.template_url, Some(vec![]));
}

#[test]
fn malformed_file_is_reported_and_others_continue() {
    let dir = tempfile::TempDir::new().unwrap();
    write_project(dir.path(), true);

    let report = analyzer().analyze(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(report.files_analyzed, 4);
    assert_eq!(report.records.len(), 3);
    assert_eq!(report.errors.len(), 1);

    let failure = &report.errors[0];
    assert_eq!(failure.path, dir.path().join("c_bad.ts"));
    match failure.error.downcast_ref::<ExtractError>() {
        Some(ExtractError::MalformedConfig {
            declaration,
            property,
            found,
            ..
        }) => {
            assert_eq!(declaration, "Bad");
            assert_eq!(property, "providers");
            assert_eq!(found, "object literal");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn fail_fast_stops_at_first_bad_file() {
    let dir = tempfile::TempDir::new().unwrap();
    write_project(dir.path(), true);

    let err = analyzer()
        .with_fail_fast(true)
        .analyze(&[dir.path().to_path_buf()])
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ExtractError>(),
        Some(ExtractError::MalformedConfig { .. })
    ));
}

#[test]
fn unresolvable_matching_annotation_fails_the_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("member.ts");
    fs::write(&file, "@ng.Component({providers: [A]})\nclass Odd {}\n").unwrap();

    let report = analyzer().analyze(&[file]).unwrap();
    assert!(report.records.is_empty());
    assert!(matches!(
        report.errors[0].error.downcast_ref::<ExtractError>(),
        Some(ExtractError::UnresolvableAnnotation { .. })
    ));
}

#[test]
fn custom_pattern_selects_other_annotations() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("pipe.ts");
    fs::write(
        &file,
        "@Injectable()\n@Pipe({providers: ['x/y/Formatter']})\nexport class Money {}\n",
    )
    .unwrap();

    let extractor = Extractor::new(AnnotationFilter::new("^Pipe$").unwrap());
    let report = DependencyAnalyzer::new_with_cache(extractor, None)
        .analyze(&[file])
        .unwrap();

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].providers, strings(&["Formatter"]));
    assert_eq!(report.records[0].directives, None);
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempfile::TempDir::new().unwrap();
    write_project(dir.path(), true);
    let inputs = [dir.path().to_path_buf()];

    let first: Vec<DependencyRecord> = analyzer().analyze(&inputs).unwrap().records;
    let second: Vec<DependencyRecord> = analyzer().analyze(&inputs).unwrap().records;
    assert_eq!(first, second);
}

#[test]
fn cached_parses_give_the_same_records() {
    let dir = tempfile::TempDir::new().unwrap();
    write_project(dir.path(), false);
    let cache_dir = dir.path().join(".cache");
    let inputs = [dir.path().join("a_app.ts"), dir.path().join("b_twice.ts")];

    let cached = || {
        DependencyAnalyzer::new_with_cache(
            Extractor::default(),
            Some(ngdeps::parsers::cache::ParseCache::new(Some(cache_dir.clone())).unwrap()),
        )
    };

    let cold = cached().analyze(&inputs).unwrap();
    assert_eq!(cold.cache_hits, 0);
    let warm = cached().analyze(&inputs).unwrap();
    assert_eq!(warm.cache_hits, 2);
    assert_eq!(cold.records, warm.records);
}

#[test]
fn analyze_parsed_reuses_trees_without_touching_disk() {
    use ngdeps::parsers::typescript::TypeScriptParser;

    let parser = TypeScriptParser::new().unwrap();
    let files = vec![
        parser.parse_source(Path::new("app.ts"), APP).unwrap(),
        parser.parse_source(Path::new("bad.ts"), BAD).unwrap(),
    ];

    let report = analyzer().analyze_parsed(&files).unwrap();
    assert_eq!(report.files_analyzed, 2);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.errors[0].path, Path::new("bad.ts"));

    // Extraction leaves the trees untouched.
    let again = analyzer().analyze_parsed(&files).unwrap();
    assert_eq!(report.records, again.records);
}

#[test]
fn escaped_string_literals_are_decoded_before_normalization() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("escaped.ts");
    fs::write(
        &file,
        r#"@Component({templateUrl: 'a\/b\'c.html', providers: [provide('x/Token', {}), "y\/Z"]})
class A {}
"#,
    )
    .unwrap();

    let report = analyzer().analyze(&[file]).unwrap();
    assert_eq!(report.records[0].template_url, strings(&["b'c.html"]));
    assert_eq!(report.records[0].providers, strings(&["x/Token*", "Z"]));
}

#[test]
fn uncached_analyzer_parses_every_run() {
    let dir = tempfile::TempDir::new().unwrap();
    write_project(dir.path(), false);
    let inputs = [dir.path().join("a_app.ts")];

    let analyzer = analyzer();
    assert_eq!(analyzer.analyze(&inputs).unwrap().cache_hits, 0);
    assert_eq!(analyzer.analyze(&inputs).unwrap().cache_hits, 0);
}
