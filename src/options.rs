/// Project and task options for the booking form
use serde::{Deserialize, Serialize};

/// A project as returned by the booking API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub intern: bool,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub billable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOption {
    pub value: u64,
    pub label: String,
    pub customer_name: String,
    pub tasks: Vec<TaskOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOption {
    pub value: u64,
    pub label: String,
    pub billable: bool,
}

/// Projects of one customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionGroup {
    pub label: String,
    pub options: Vec<ProjectOption>,
}

// Internal projects and non-billable tasks are shown in parentheses
fn parenthesize(name: &str, plain: bool) -> String {
    if plain {
        name.to_string()
    } else {
        format!("({})", name)
    }
}

fn task_options(tasks: &[Task]) -> Vec<TaskOption> {
    tasks
        .iter()
        .map(|task| TaskOption {
            value: task.id,
            label: parenthesize(&task.name, task.billable),
            billable: task.billable,
        })
        .collect()
}

pub fn project_options(projects: &[Project]) -> Vec<ProjectOption> {
    projects
        .iter()
        .map(|project| ProjectOption {
            value: project.id,
            label: parenthesize(&project.name, !project.intern),
            customer_name: project.customer_name.clone(),
            tasks: task_options(&project.tasks),
        })
        .collect()
}

/// Group projects by customer, customers in order of first appearance
pub fn grouped_project_options(projects: &[Project]) -> Vec<OptionGroup> {
    let mut groups: Vec<OptionGroup> = Vec::new();

    for option in project_options(projects) {
        match groups.iter_mut().find(|g| g.label == option.customer_name) {
            Some(group) => group.options.push(option),
            None => groups.push(OptionGroup {
                label: option.customer_name.clone(),
                options: vec![option],
            }),
        }
    }

    groups
}

/// Look up a project option by an id taken from a URL or form. Ids that are
/// not numbers match nothing.
pub fn find_project<'a>(groups: &'a [OptionGroup], id: &str) -> Option<&'a ProjectOption> {
    let id: u64 = id.trim().parse().ok()?;
    groups
        .iter()
        .flat_map(|group| group.options.iter())
        .find(|option| option.value == id)
}

pub fn find_task<'a>(project: &'a ProjectOption, id: &str) -> Option<&'a TaskOption> {
    let id: u64 = id.trim().parse().ok()?;
    project.tasks.iter().find(|task| task.value == id)
}
