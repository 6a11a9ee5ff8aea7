//! Persona templates and turn instructions.

/// Debaters all share this preamble; the personality is appended per agent.
pub fn debate_system_prompt(topic: &str, personality: &str) -> String {
    format!(
        "You are a debater in a debate. The topic is: \"{topic}\".\n\
         Be assertive, keep your arguments concise and respond directly to the previous debater.\n\
         YOUR PERSONALITY: {personality}. Defend this point of view."
    )
}

pub fn debate_opening_instruction(topic: &str) -> String {
    format!(
        "You are the first to speak. Open the debate on the topic: \"{topic}\". \
         Present your opening argument."
    )
}

pub fn debate_reply_instruction(previous: &str) -> String {
    format!(
        "The previous debater said: \"{previous}\". \
         Respond to this argument and defend your point of view."
    )
}

fn trial_preamble(case_facts: &str) -> String {
    format!(
        "You are an agent in a criminal trial simulation.\n\
         The facts of the case are: \"{case_facts}\".\n\
         Stick strictly to the facts provided and to your role. \
         Be professional and use appropriate legal language."
    )
}

pub fn prosecutor_system_prompt(case_facts: &str) -> String {
    format!(
        "{}\nYour role: PROSECUTION.\n\
         Your objective: Prove the defendant's guilt beyond any reasonable doubt, using the available facts.",
        trial_preamble(case_facts)
    )
}

pub fn defense_system_prompt(case_facts: &str) -> String {
    format!(
        "{}\nYour role: DEFENSE COUNSEL.\n\
         Your objective: Create reasonable doubt or prove the defendant's innocence, \
         using the available facts and contesting the prosecution.",
        trial_preamble(case_facts)
    )
}

pub fn judge_system_prompt(case_facts: &str) -> String {
    format!(
        "{}\nYour role: JUDGE.\n\
         Your objective: Be impartial, hear both sides and, at the end, deliver a verdict \
         based SOLELY on the arguments presented and the facts of the case.",
        trial_preamble(case_facts)
    )
}

pub const JUDGE_VERDICT_INSTRUCTION: &str = "You have heard the entire trial (recorded in the history) \
    and reviewed the initial facts of the case. Deliberate and deliver your final verdict. \
    Explain your reasoning clearly, citing the arguments that convinced you.";

/// Placeholder replaced by the opposing side's latest statement.
pub const QUOTE: &str = "{quote}";

pub const PROSECUTION_OPENING: &str =
    "Present your opening statement, summarizing what you intend to prove.";
pub const DEFENSE_OPENING: &str = "The prosecution has made its opening statement. \
    Now present your opening statement, summarizing your line of defense.";

pub const PROSECUTION_ROUND_1: &str = "The defense opened with: \"{quote}\". \
    Present your first main argument, piece of evidence or witness testimony summary.";
pub const DEFENSE_ROUND_1: &str = "The prosecution argued: \"{quote}\". \
    Present your cross-examination or rebuttal argument.";
pub const PROSECUTION_ROUND_2: &str = "The defense responded: \"{quote}\". \
    Present your reply or your next argument.";
pub const DEFENSE_ROUND_2: &str = "The prosecution continued: \"{quote}\". \
    Present your rejoinder or your next line of defense.";
pub const PROSECUTION_ROUND_3: &str = "The defense said: \"{quote}\". \
    Present your final argument or key piece of evidence.";
pub const DEFENSE_ROUND_3: &str = "The prosecution concluded its argumentation with: \"{quote}\". \
    Present your final rebuttal argument.";

pub const PROSECUTION_CLOSING: &str = "Present your closing argument. \
    Summarize your case and why the defendant should be found guilty.";
pub const DEFENSE_CLOSING: &str = "The prosecution has finished. Present your closing argument. \
    Summarize your case and why the defendant should be found not guilty \
    or why reasonable doubt exists.";
pub const PROSECUTION_REBUTTAL: &str = "The defense closed with: \"{quote}\". \
    Deliver a brief rebuttal to the defense's closing argument, addressing only the points it raised.";

pub const ANNOUNCE_OPENING: &str =
    "The court is in session. The prosecution may begin with its opening statement.";
pub const ANNOUNCE_ARGUMENTS: &str = "Opening statements are concluded. \
    The prosecution may call its first witness or present its first main argument.";
pub const ANNOUNCE_CLOSING: &str = "Both sides have presented their arguments. \
    We proceed to closing arguments. Prosecution, please.";
pub const ANNOUNCE_VERDICT: &str = "Closing arguments are concluded. \
    The court will deliberate. The judge will deliver the verdict.";
