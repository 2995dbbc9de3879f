//! Randomized, human-sounding instruction generation.
//!
//! Instructions are drawn from weighted template pools, filled in from fixed
//! vocabularies plus the current workspace file listing, optionally prefixed
//! with a conversational starter, and occasionally given a single typo. A
//! simple Markov-style rule keeps the same category from being chosen twice
//! in a row.

use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Category label attached to every generated instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Additive,
    Refactoring,
    Expansion,
    Structural,
    Followup,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Additive => "additive",
            Category::Refactoring => "refactoring",
            Category::Expansion => "expansion",
            Category::Structural => "structural",
            Category::Followup => "followup",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated instruction plus its category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPrompt {
    pub text: String,
    pub category: Category,
}

const STARTERS: [&str; 20] = [
    "hey can you",
    "could you",
    "can you",
    "yo",
    "ok now",
    "alright,",
    "next up:",
    "one more thing —",
    "also,",
    "hmm actually",
    "i think we need to",
    "let's",
    "go ahead and",
    "would you mind",
    "real quick,",
    "oh wait,",
    "before i forget,",
    "",
    "",
    "",
];

const ADDITIVE: [&str; 8] = [
    "build out a full {concept} module in a {name}/ folder. want the main implementation, tests, types, readme — the works. go big on this one",
    "add a bunch of CRUD routes for /{path}. like list, get, create, update, delete. make a {name}Service and {name}Repository too with an in-memory store. should be multiple files",
    "create a {concept} library from scratch in {name}/. include a factory, config schema, error classes, and a demo file that actually uses everything. don't hold back on the implementation",
    "write a full test suite for every module in the project. i want happy path, edge cases, error cases, the lot. like 15+ test functions per file minimum",
    "build a CLI tool in cli/ that hooks into every module. argument parsing, help text, colors, at least 8 subcommands. make it feel real",
    "add a complete {domain} utility library. i want like 20+ functions, each properly implemented, not just stubs. put them in {name}.js",
    "create a {concept} and integrate it with the existing codebase. wire it up to the routes and make sure everything actually connects",
    "we need a proper data model layer. create models/ with at least 5 entity classes, validation, serialization, relationships between them. go deep",
];

const REFACTORING: [&str; 7] = [
    "rewrite everything to use ES6 classes. i want private fields, getters, setters, factory methods, toString, toJSON, clone — the full deal. add a base class too",
    "convert the whole codebase to functional style. pure functions, Object.freeze everywhere, pipe/compose, Result/Option monads, currying. make a fp-utils.js with like 20 helpers",
    "make everything use the builder pattern with method chaining. every public API should be fluent. rewrite all existing code to use the new builders",
    "refactor into a proper layered architecture — controllers/, services/, repositories/, models/, middleware/. move everything, rewrite imports, add error types per layer",
    "rewrite all modules to use observables and event emitters. every state change should fire events. add operators like map, filter, debounce. build an event bus that connects everything",
    "this code is getting messy. split every file that's over 50 lines into smaller modules. create proper directory structure for each domain",
    "convert everything to use async/await properly. add proper error handling, timeouts, retries with backoff on every async operation",
];

const EXPANSION: [&str; 7] = [
    "add logging everywhere. i mean everywhere — every function entry/exit, args, return values, errors. build a proper Logger with transports and log levels and correlation IDs",
    "build like 10 middleware functions — auth, rate limiting, validation, compression, cors, request IDs, error handling, timing headers, body parsing, the works. wire them into every route",
    "the error handling is weak. create 15+ custom error classes, add try/catch everywhere, add circuit breakers, retry logic with backoff and jitter, dead letter queues, global error reporter",
    "implement a full caching layer — LRU cache, TTL, write-through, cache warming, stats tracking, cache middleware for routes. add a /cache-admin endpoint for management",
    "build a metrics system from scratch. counters, gauges, histograms, timers. instrument every function. add a /metrics endpoint and a health check that tests all components",
    "add input validation to literally every function that takes arguments. use a schema-based approach, create a validator factory, add helpful error messages",
    "add websocket support. create a ws module with connection management, rooms, broadcasts, heartbeats, reconnection logic, message queuing for offline clients",
];

const STRUCTURAL: [&str; 6] = [
    "restructure the whole thing into a monorepo with packages/ — like core, http, utils, config, cli. each gets its own index.js and internal structure. rewrite all the imports",
    "make this plugin-based. create a plugin loader, registry, lifecycle hooks, plugin config, inter-plugin events. build 5 built-in plugins in their own directories",
    "convert to domain-driven design. bounded contexts, aggregate roots, value objects, domain events, repos. set up 3 contexts — users, orders, inventory — with full implementations",
    "reorganize into a microservices layout — api-gateway, user-service, product-service, notification-service. each with routes, controllers, services, models. add a message bus between them",
    "build a module federation system. dynamic loader, dependency resolver with topological sort, lifecycle management, hot reload simulation, module isolation. refactor everything into loadable modules",
    "move to a feature-based folder structure. each feature gets its own directory with routes, handlers, services, tests, types. should have at least 6 features",
];

const FOLLOWUPS: [&str; 6] = [
    "actually that last change was good but can you expand on it more? add more edge cases and make the implementations more thorough",
    "nice, now add comprehensive tests for everything you just wrote. cover all the branches",
    "ok that's a start but i want this way more fleshed out. add error handling, validation, logging to everything you just added",
    "good, now create a demo/example file that exercises all the new code you added. show every feature being used",
    "looks decent. now add JSDoc to every public function and create a types.js with all the type definitions",
    "alright now wire up everything you just built with the rest of the project. update all the existing files to use the new stuff",
];

const CONCEPTS: [&str; 15] = [
    "linked list",
    "pub/sub event bus",
    "state machine",
    "priority queue",
    "LRU cache",
    "observable store",
    "middleware pipeline",
    "command dispatcher",
    "circuit breaker",
    "dependency injection container",
    "job scheduler",
    "streaming data pipeline",
    "graph data structure",
    "binary search tree",
    "bloom filter",
];

const DOMAINS: [&str; 9] = [
    "string manipulation",
    "array transformations",
    "date/time formatting",
    "deep object operations",
    "math and statistics",
    "encoding and hashing",
    "url parsing and building",
    "color conversion",
    "file path utilities",
];

const NAMES: [&str; 15] = [
    "scheduler",
    "transformer",
    "pipeline",
    "registry",
    "dispatcher",
    "analyzer",
    "serializer",
    "aggregator",
    "emitter",
    "resolver",
    "orchestrator",
    "processor",
    "gateway",
    "broker",
    "handler",
];

const METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "PATCH"];

const PATHS: [&str; 13] = [
    "users",
    "items",
    "stats",
    "logs",
    "tasks",
    "events",
    "metrics",
    "settings",
    "status",
    "debug",
    "webhooks",
    "notifications",
    "workflows",
];

/// Used for `{file}` when the workspace yields no candidates.
const FALLBACK_FILES: [&str; 4] = ["index.js", "routes.js", "utils.js", "config.js"];

/// Stateful instruction generator.
///
/// Owns the anti-repetition bookkeeping: the previous non-followup category
/// is excluded from the next selection (unless that would leave nothing to
/// choose from), and follow-up instructions only become eligible after the
/// first call.
#[derive(Debug)]
pub struct PromptGenerator {
    followup_probability: f64,
    typo_probability: f64,
    last_category: Option<Category>,
    calls: u64,
}

impl PromptGenerator {
    pub fn new(followup_probability: f64, typo_probability: f64) -> Self {
        Self {
            followup_probability,
            typo_probability,
            last_category: None,
            calls: 0,
        }
    }

    /// Generate the next instruction.
    ///
    /// `workspace_files` feeds `{file}` resolution; an empty slice degrades
    /// to a fixed fallback list so a literal placeholder can never survive.
    pub fn next<R: Rng>(&mut self, rng: &mut R, workspace_files: &[String]) -> GeneratedPrompt {
        self.calls += 1;

        if self.calls > 1 && rng.r#gen::<f64>() < self.followup_probability {
            let text = (*FOLLOWUPS.choose(rng).expect("followup pool is non-empty")).to_string();
            // Follow-ups reference the previous instruction, so they do not
            // participate in the anti-repeat rule.
            return GeneratedPrompt {
                text,
                category: Category::Followup,
            };
        }

        let mut candidates: Vec<(&str, Category)> = catalog().collect();
        if let Some(last) = self.last_category {
            let others: Vec<(&str, Category)> = candidates
                .iter()
                .copied()
                .filter(|(_, category)| *category != last)
                .collect();
            if !others.is_empty() {
                candidates = others;
            }
        }

        let &(template, category) = candidates.choose(rng).expect("catalog is non-empty");
        self.last_category = Some(category);

        let body = fill_template(rng, template, workspace_files);
        let starter = *STARTERS.choose(rng).expect("starter pool is non-empty");
        let raw = if starter.is_empty() {
            body
        } else {
            format!("{starter} {body}")
        };
        let text = maybe_transpose(rng, raw, self.typo_probability);

        GeneratedPrompt { text, category }
    }
}

fn catalog() -> impl Iterator<Item = (&'static str, Category)> {
    let pools: [(&[&str], Category); 4] = [
        (&ADDITIVE, Category::Additive),
        (&REFACTORING, Category::Refactoring),
        (&EXPANSION, Category::Expansion),
        (&STRUCTURAL, Category::Structural),
    ];
    pools
        .into_iter()
        .flat_map(|(pool, category)| pool.iter().map(move |template| (*template, category)))
}

/// Resolve every placeholder token, sampling one value per token kind.
fn fill_template<R: Rng>(rng: &mut R, template: &str, workspace_files: &[String]) -> String {
    let file = match workspace_files.choose(rng) {
        Some(name) => name.clone(),
        None => (*FALLBACK_FILES.choose(rng).expect("fallback list is non-empty")).to_string(),
    };
    let name = *NAMES.choose(rng).expect("name pool is non-empty");
    let concept = *CONCEPTS.choose(rng).expect("concept pool is non-empty");
    let domain = *DOMAINS.choose(rng).expect("domain pool is non-empty");
    let method = *METHODS.choose(rng).expect("method pool is non-empty");
    let path = *PATHS.choose(rng).expect("path pool is non-empty");

    template
        .replace("{file}", &file)
        .replace("{name}", name)
        .replace("{concept}", concept)
        .replace("{domain}", domain)
        .replace("{method}", method)
        .replace("{path}", path)
}

/// With the given probability, transpose one interior adjacent character
/// pair in a randomly chosen word of length >= 4. Shorter picks leave the
/// text unchanged rather than re-rolling.
fn maybe_transpose<R: Rng>(rng: &mut R, text: String, probability: f64) -> String {
    if rng.r#gen::<f64>() >= probability {
        return text;
    }
    let mut words: Vec<String> = text.split(' ').map(str::to_string).collect();
    let idx = rng.gen_range(0..words.len());
    let mut chars: Vec<char> = words[idx].chars().collect();
    if chars.len() < 4 {
        return text;
    }
    let i = rng.gen_range(1..chars.len() - 1);
    chars.swap(i, i + 1);
    words[idx] = chars.into_iter().collect();
    words.join(" ")
}
