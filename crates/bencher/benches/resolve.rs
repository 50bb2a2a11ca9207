use bencher::{TestCase, TestGroup};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use http::Method;
use micro_dispatch::{App, Controller, RequestContext, handler_fn};
use std::hint::black_box;

fn app(group: TestGroup) -> App {
    let mut app = App::new();
    for i in 0..group.controllers() {
        let noop = || handler_fn(|_req: RequestContext| async {});
        let controller = Controller::builder(format!("Resource{i}"))
            .action("index", noop())
            .action("get_show", noop())
            .action("post_edit", noop())
            .action("delete_remove", noop())
            .action("feed____rss", noop())
            .formats([".json", ".xml"])
            .build();
        app.mount(controller).expect("benchmark controllers should not collide");
    }
    app
}

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::small("small_dispatch", Method::GET, "/resource0/show/42.json"),
        TestCase::small("small_not_found", Method::GET, "/missing/path"),
        TestCase::large("large_dispatch_last", Method::POST, "/resource63/edit/1"),
        TestCase::large("large_not_implemented", Method::GET, "/resource31/edit"),
        TestCase::large("large_not_found", Method::GET, "/missing/path"),
    ]
}

fn benchmark_resolve(criterion: &mut Criterion) {
    let small = app(TestGroup::Small);
    let large = app(TestGroup::Large);
    let mut group = criterion.benchmark_group("resolve");

    for case in create_test_cases() {
        let app = match case.group() {
            TestGroup::Small => &small,
            TestGroup::Large => &large,
        };
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter(|| {
                let resolution = app.routes().resolve(case.method(), case.path());
                black_box(matches!(resolution, micro_dispatch::route::Resolution::Dispatch { .. }));
            });
        });
    }

    group.finish();
}

criterion_group!(resolve, benchmark_resolve);
criterion_main!(resolve);
