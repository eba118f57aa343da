//! End-to-end tests for the hornkb engine.
//!
//! These exercise the public API the way an application would: building
//! knowledge bases from code, program text and packs, then querying them.

use hornkb::analysis::analyze;
use hornkb::config::HornConfig;
use hornkb::error::{FactError, KbError};
use hornkb::infer::ResolverConfig;
use hornkb::kb::KnowledgeBase;
use hornkb::logic::{Fact, Predicate, Rule, Term};
use hornkb::packs::KnowledgePack;
use hornkb::program::{parse_fact, parse_program, parse_rule};
use hornkb::shared::SharedKnowledgeBase;
use hornkb::unify::unify;

fn kb_from(text: &str) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new();
    kb.extend_from_program(parse_program(text).unwrap()).unwrap();
    kb
}

fn goal(text: &str) -> Fact {
    parse_fact(text).unwrap()
}

fn values(kb: &KnowledgeBase, query: &str, var: &str) -> Vec<String> {
    let mut found: Vec<String> = kb
        .answers(&goal(query), usize::MAX)
        .iter()
        .filter_map(|answer| answer.value_of(var))
        .map(|term| term.to_string())
        .collect();
    found.sort();
    found
}

#[test]
fn socrates_is_mortal() {
    let homem = Predicate::new("homem", 1);
    let mortal = Predicate::new("mortal", 1);

    let mut kb = KnowledgeBase::new();
    kb.add_fact(homem.fact(["socrates"]).unwrap()).unwrap();
    kb.add_fact(homem.fact(["platao"]).unwrap()).unwrap();
    kb.add_fact(mortal.fact(["joao"]).unwrap()).unwrap();
    kb.add_rule(Rule::new(
        mortal.fact([Term::variable("X")]).unwrap(),
        vec![homem.fact([Term::variable("X")]).unwrap()],
    ));

    assert!(kb.query(&mortal.fact(["socrates"]).unwrap()));
    assert!(kb.query(&mortal.fact(["platao"]).unwrap()));
    assert!(kb.query(&mortal.fact(["joao"]).unwrap()));
    assert!(!kb.query(&mortal.fact(["maria"]).unwrap()));
    assert!(kb.query(&homem.fact(["socrates"]).unwrap()));
    assert!(!kb.query(&homem.fact(["zeus"]).unwrap()));
}

#[test]
fn every_added_fact_is_queryable() {
    let mut kb = KnowledgeBase::new();
    let likes = Predicate::new("likes", 2);
    let pairs = [("ana", "bia"), ("bia", "caio"), ("caio", "ana"), ("ana", "ana")];
    for (a, b) in pairs {
        kb.add_fact(likes.fact([a, b]).unwrap()).unwrap();
    }
    for (a, b) in pairs {
        assert!(kb.query(&likes.fact([a, b]).unwrap()));
    }
    assert!(!kb.query(&likes.fact(["bia", "ana"]).unwrap()));
}

#[test]
fn wrong_arity_fails_construction() {
    let homem = Predicate::new("homem", 1);
    let err = homem.fact(["a", "b"]).unwrap_err();
    assert!(matches!(
        err,
        FactError::ArityMismatch {
            expected: 1,
            actual: 2,
            ..
        }
    ));
    assert!(Fact::new(homem, vec![]).is_err());
}

#[test]
fn non_ground_facts_cannot_be_stored() {
    let mut kb = KnowledgeBase::new();
    let err = kb
        .add_fact(Predicate::new("p", 1).fact([Term::variable("X")]).unwrap())
        .unwrap_err();
    assert!(matches!(err, KbError::Fact(FactError::NonGround { .. })));
}

#[test]
fn unification_is_symmetric_and_equalizes() {
    let cases = [
        ("p(X, b)", "p(a, Y)"),
        ("p(X, X)", "p(a, Z)"),
        ("p(X, Y)", "p(Y, c)"),
        ("p(X, X)", "p(a, b)"),
        ("p(a)", "q(a)"),
    ];
    for (left, right) in cases {
        let (left, right) = (goal(left), goal(right));
        let lr = unify(&left, &right);
        let rl = unify(&right, &left);
        assert_eq!(lr.is_ok(), rl.is_ok(), "{left} vs {right}");
        for subst in [lr, rl].into_iter().flatten() {
            assert_eq!(subst.apply(&left), subst.apply(&right));
        }
    }
}

#[test]
fn cyclic_rule_terminates_false() {
    let kb = kb_from("p(X) :- p(X).");
    let (answer, stats) = kb.resolve_with_stats(&goal("p(anything)"));
    assert!(answer.is_none());
    assert!(!stats.budget_exhausted);
    assert!(stats.loop_prunes > 0);
}

#[test]
fn mutual_recursion_terminates() {
    let kb = kb_from("p(a).\np(X) :- q(X).\nq(X) :- p(X).");
    assert!(kb.query(&goal("q(a)")));
    assert!(!kb.query(&goal("q(b)")));
    assert!(!kb.query(&goal("p(b)")));
}

#[test]
fn grandparent_joins_two_literals() {
    let kb = kb_from(
        "parent(a, b).\n\
         parent(b, c).\n\
         grandparent(X, Z) :- parent(X, Y) AND parent(Y, Z).",
    );
    assert!(kb.query(&goal("grandparent(a, c)")));
    assert!(!kb.query(&goal("grandparent(a, d)")));
    assert!(!kb.query(&goal("grandparent(b, c)")));
    assert_eq!(values(&kb, "grandparent(a, Who)", "Who"), vec!["c"]);
}

#[test]
fn backtracking_retries_earlier_literals() {
    // The first r/1 fact leads nowhere; only the second satisfies s/1.
    let kb = kb_from("r(a).\nr(b).\ns(b).\nq(X) :- r(X), s(X).");
    assert!(kb.query(&goal("q(b)")));
    assert!(!kb.query(&goal("q(a)")));
    let answer = kb.solve(&goal("q(X)")).unwrap();
    assert_eq!(answer.value_of("X"), Some(Term::constant("b")));
}

#[test]
fn alternative_rules_are_tried_in_order() {
    let kb = kb_from(
        "bird(tweety).\nplane(jet).\n\
         flies(X) :- bird(X).\n\
         flies(X) :- plane(X).",
    );
    let answers = kb.answers(&goal("flies(X)"), 10);
    let order: Vec<String> = answers
        .iter()
        .filter_map(|a| a.value_of("X"))
        .map(|t| t.to_string())
        .collect();
    assert_eq!(order, vec!["tweety", "jet"]);
}

#[test]
fn left_recursive_closure_is_complete() {
    let kb = kb_from(
        "edge(a, b). edge(b, c). edge(c, d). edge(d, a). edge(x, y).\n\
         path(X, Y) :- path(X, Z), edge(Z, Y).\n\
         path(X, Y) :- edge(X, Y).",
    );
    assert!(kb.query(&goal("path(a, d)")));
    assert!(kb.query(&goal("path(a, a)")));
    assert!(!kb.query(&goal("path(a, x)")));
    assert_eq!(values(&kb, "path(b, T)", "T"), vec!["a", "b", "c", "d"]);
}

#[test]
fn right_recursive_closure_over_a_cycle() {
    let kb = kb_from(
        "edge(a, b). edge(b, c). edge(c, a).\n\
         path(X, Y) :- edge(X, Y).\n\
         path(X, Y) :- edge(X, Z), path(Z, Y).",
    );
    assert!(kb.query(&goal("path(a, a)")));
    assert_eq!(values(&kb, "path(a, T)", "T"), vec!["a", "b", "c"]);
    assert!(!kb.query(&goal("path(a, z)")));
}

#[test]
fn answers_are_distinct() {
    // Two derivations of the same answer yield it once.
    let kb = kb_from("p(a).\nq(a).\nr(X) :- p(X).\nr(X) :- q(X).");
    assert_eq!(kb.answers(&goal("r(X)"), 10).len(), 1);
    assert_eq!(kb.answers(&goal("r(a)"), 10).len(), 1);
}

#[test]
fn shared_variables_across_goal_positions() {
    let kb = kb_from("likes(ana, ana).\nlikes(ana, bia).\nself_love(X) :- likes(X, X).");
    assert_eq!(values(&kb, "likes(P, P)", "P"), vec!["ana"]);
    assert!(kb.query(&goal("self_love(ana)")));
    assert!(!kb.query(&goal("self_love(bia)")));
}

#[test]
fn zero_arity_predicates() {
    let kb = kb_from("raining.\nwet :- raining.\numbrella :- wet, windy.");
    assert!(kb.query(&goal("wet")));
    assert!(!kb.query(&goal("umbrella")));
}

#[test]
fn step_budget_gives_up_gracefully() {
    let mut kb = kb_from(
        "edge(a, b). edge(b, c). edge(c, d).\n\
         path(X, Y) :- edge(X, Y).\n\
         path(X, Y) :- edge(X, Z), path(Z, Y).",
    );
    kb.set_config(ResolverConfig {
        max_steps: 2,
        ..Default::default()
    });
    let (answer, stats) = kb.resolve_with_stats(&goal("path(a, d)"));
    assert!(answer.is_none());
    assert!(stats.budget_exhausted);

    kb.set_config(ResolverConfig::default());
    assert!(kb.query(&goal("path(a, d)")));
}

#[test]
fn family_pack_derives_ancestors() {
    let mut kb = KnowledgeBase::new();
    KnowledgePack::bundled("family")
        .unwrap()
        .apply(&mut kb)
        .unwrap();

    assert!(kb.query(&goal("grandparent(abe, bart)")));
    assert!(kb.query(&goal("ancestor(abe, ling)")));
    assert!(!kb.query(&goal("ancestor(ling, abe)")));
    assert_eq!(
        values(&kb, "grandparent(homer, G)", "G"),
        vec!["ling"]
    );
    assert_eq!(
        values(&kb, "ancestor(abe, D)", "D"),
        vec!["bart", "homer", "ling", "lisa", "maggie"]
    );
}

#[test]
fn pack_and_program_files_load_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();

    let pack_path = dir.path().join("greek.toml");
    std::fs::write(
        &pack_path,
        r#"
[pack]
name = "greek"
description = "Gods are immortal."

[[predicates]]
name = "deus"
arity = 1

[clauses]
facts = ["deus(zeus)"]
rules = ["imortal(X) :- deus(X)"]
"#,
    )
    .unwrap();

    let program_path = dir.path().join("extra.kb");
    std::fs::write(&program_path, "deus(hera).\nolimpico(X) :- imortal(X).\n").unwrap();

    let mut kb = KnowledgeBase::new();
    let report = KnowledgePack::load(&pack_path).unwrap().apply(&mut kb).unwrap();
    assert_eq!(report.name, "greek");
    let text = std::fs::read_to_string(&program_path).unwrap();
    kb.extend_from_program(parse_program(&text).unwrap()).unwrap();

    assert!(kb.query(&goal("olimpico(hera)")));
    assert!(kb.query(&goal("imortal(zeus)")));
    assert!(!kb.query(&goal("imortal(socrates)")));
}

#[test]
fn config_file_bounds_the_resolver() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("hornkb.toml");
    // Depth 2 allows one recursive step below the goal's own rule.
    std::fs::write(&path, "[resolver]\nmax_depth = 2\n").unwrap();
    let config = HornConfig::load(&path).unwrap();

    let mut kb = KnowledgeBase::with_config(config.resolver);
    kb.extend_from_program(
        parse_program(
            "parent(a, b). parent(b, c). parent(c, d).\n\
             ancestor(X, Y) :- parent(X, Y).\n\
             ancestor(X, Y) :- parent(X, Z), ancestor(Z, Y).",
        )
        .unwrap(),
    )
    .unwrap();
    assert!(kb.query(&goal("ancestor(a, c)")));
    assert!(!kb.query(&goal("ancestor(a, d)")));
}

#[test]
fn analysis_over_loaded_program() {
    let kb = kb_from(
        "parent(a, b).\n\
         ancestor(X, Y) :- parent(X, Y).\n\
         ancestor(X, Z) :- ancestor(X, Y), parent(Y, Z).\n\
         cousin(X, Y) :- sibling(X, Y).\n\
         anything(X, Y) :- parent(X, X).",
    );
    let report = analyze(&kb);
    assert_eq!(report.recursive_predicates, vec![Predicate::new("ancestor", 2)]);
    assert_eq!(report.undefined_predicates, vec![Predicate::new("sibling", 2)]);
    assert_eq!(report.unsafe_rules.len(), 1);
    assert_eq!(report.unsafe_rules[0].index, 3);
}

#[test]
fn removal_retracts_consequences() {
    let mut kb = kb_from("homem(socrates).\nmortal(X) :- homem(X).");
    assert!(kb.query(&goal("mortal(socrates)")));
    assert!(kb.remove_fact(&goal("homem(socrates)")));
    assert!(!kb.query(&goal("mortal(socrates)")));

    let rule = kb.remove_rule(0).unwrap();
    assert_eq!(rule, parse_rule("mortal(X) :- homem(X)").unwrap());
    kb.clear();
    assert!(kb.is_empty());
}

#[test]
fn shared_knowledge_base_across_threads() {
    let shared = SharedKnowledgeBase::new(kb_from("homem(socrates).\nmortal(X) :- homem(X)."));
    let writer = {
        let shared = shared.clone();
        std::thread::spawn(move || {
            shared
                .add_fact(goal("homem(platao)"))
                .unwrap();
        })
    };
    writer.join().unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            std::thread::spawn(move || shared.query(&goal("mortal(platao)")))
        })
        .collect();
    for reader in readers {
        assert!(reader.join().unwrap());
    }
}
