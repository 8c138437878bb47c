//! Built-in team tables.
//!
//! Codes follow the exchange ticker conventions; aliases cover full names,
//! nicknames, alternate codes and city names that identify a single team
//! within the league. Shared cities (New York, Los Angeles, Chicago in
//! MLB) are deliberately absent.

pub type TeamRow = (&'static str, &'static [&'static str]);

pub const NFL: &[TeamRow] = &[
    ("ARI", &["Arizona Cardinals", "Cardinals", "Arizona"]),
    ("ATL", &["Atlanta Falcons", "Falcons", "Atlanta"]),
    ("BAL", &["Baltimore Ravens", "Ravens", "Baltimore"]),
    ("BUF", &["Buffalo Bills", "Bills", "Buffalo"]),
    ("CAR", &["Carolina Panthers", "Panthers", "Carolina"]),
    ("CHI", &["Chicago Bears", "Bears", "Chicago"]),
    ("CIN", &["Cincinnati Bengals", "Bengals", "Cincinnati"]),
    ("CLE", &["Cleveland Browns", "Browns", "Cleveland"]),
    ("DAL", &["Dallas Cowboys", "Cowboys", "Dallas"]),
    ("DEN", &["Denver Broncos", "Broncos", "Denver"]),
    ("DET", &["Detroit Lions", "Lions", "Detroit"]),
    ("GB", &["Green Bay Packers", "Packers", "Green Bay", "GNB"]),
    ("HOU", &["Houston Texans", "Texans", "Houston"]),
    ("IND", &["Indianapolis Colts", "Colts", "Indianapolis"]),
    ("JAX", &["Jacksonville Jaguars", "Jaguars", "Jacksonville", "JAC"]),
    ("KC", &["Kansas City Chiefs", "Chiefs", "Kansas City", "KAN"]),
    ("LV", &["Las Vegas Raiders", "Raiders", "Las Vegas", "LVR", "Oakland Raiders"]),
    ("LAC", &["Los Angeles Chargers", "Chargers", "LA Chargers"]),
    ("LAR", &["Los Angeles Rams", "Rams", "LA Rams", "LA"]),
    ("MIA", &["Miami Dolphins", "Dolphins", "Miami"]),
    ("MIN", &["Minnesota Vikings", "Vikings", "Minnesota"]),
    ("NE", &["New England Patriots", "Patriots", "New England", "NWE"]),
    ("NO", &["New Orleans Saints", "Saints", "New Orleans", "NOR"]),
    ("NYG", &["New York Giants", "Giants", "NY Giants"]),
    ("NYJ", &["New York Jets", "Jets", "NY Jets"]),
    ("PHI", &["Philadelphia Eagles", "Eagles", "Philadelphia"]),
    ("PIT", &["Pittsburgh Steelers", "Steelers", "Pittsburgh"]),
    ("SF", &["San Francisco 49ers", "49ers", "Niners", "San Francisco", "SFO"]),
    ("SEA", &["Seattle Seahawks", "Seahawks", "Seattle"]),
    ("TB", &["Tampa Bay Buccaneers", "Buccaneers", "Bucs", "Tampa Bay", "TAM"]),
    ("TEN", &["Tennessee Titans", "Titans", "Tennessee"]),
    ("WAS", &["Washington Commanders", "Commanders", "Washington", "WSH"]),
];

pub const NBA: &[TeamRow] = &[
    ("ATL", &["Atlanta Hawks", "Hawks", "Atlanta"]),
    ("BOS", &["Boston Celtics", "Celtics", "Boston"]),
    ("BKN", &["Brooklyn Nets", "Nets", "Brooklyn", "BRK"]),
    ("CHA", &["Charlotte Hornets", "Hornets", "Charlotte", "CHO"]),
    ("CHI", &["Chicago Bulls", "Bulls", "Chicago"]),
    ("CLE", &["Cleveland Cavaliers", "Cavaliers", "Cavs", "Cleveland"]),
    ("DAL", &["Dallas Mavericks", "Mavericks", "Mavs", "Dallas"]),
    ("DEN", &["Denver Nuggets", "Nuggets", "Denver"]),
    ("DET", &["Detroit Pistons", "Pistons", "Detroit"]),
    ("GSW", &["Golden State Warriors", "Warriors", "Golden State", "GS"]),
    ("HOU", &["Houston Rockets", "Rockets", "Houston"]),
    ("IND", &["Indiana Pacers", "Pacers", "Indiana"]),
    ("LAC", &["Los Angeles Clippers", "LA Clippers", "Clippers"]),
    ("LAL", &["Los Angeles Lakers", "LA Lakers", "Lakers"]),
    ("MEM", &["Memphis Grizzlies", "Grizzlies", "Memphis"]),
    ("MIA", &["Miami Heat", "Heat", "Miami"]),
    ("MIL", &["Milwaukee Bucks", "Bucks", "Milwaukee"]),
    ("MIN", &["Minnesota Timberwolves", "Timberwolves", "Wolves", "Minnesota"]),
    ("NOP", &["New Orleans Pelicans", "Pelicans", "New Orleans", "NO"]),
    ("NYK", &["New York Knicks", "Knicks", "NY Knicks"]),
    ("OKC", &["Oklahoma City Thunder", "Thunder", "Oklahoma City"]),
    ("ORL", &["Orlando Magic", "Magic", "Orlando"]),
    ("PHI", &["Philadelphia 76ers", "76ers", "Sixers", "Philadelphia"]),
    ("PHX", &["Phoenix Suns", "Suns", "Phoenix", "PHO"]),
    ("POR", &["Portland Trail Blazers", "Trail Blazers", "Blazers", "Portland"]),
    ("SAC", &["Sacramento Kings", "Kings", "Sacramento"]),
    ("SAS", &["San Antonio Spurs", "Spurs", "San Antonio", "SA"]),
    ("TOR", &["Toronto Raptors", "Raptors", "Toronto"]),
    ("UTA", &["Utah Jazz", "Jazz", "Utah"]),
    ("WAS", &["Washington Wizards", "Wizards", "Washington", "WSH"]),
];

pub const MLB: &[TeamRow] = &[
    ("ARI", &["Arizona Diamondbacks", "Diamondbacks", "D-backs", "Arizona", "AZ"]),
    ("ATL", &["Atlanta Braves", "Braves", "Atlanta"]),
    ("BAL", &["Baltimore Orioles", "Orioles", "Baltimore"]),
    ("BOS", &["Boston Red Sox", "Red Sox", "Boston"]),
    ("CHC", &["Chicago Cubs", "Cubs"]),
    ("CWS", &["Chicago White Sox", "White Sox", "CHW"]),
    ("CIN", &["Cincinnati Reds", "Reds", "Cincinnati"]),
    ("CLE", &["Cleveland Guardians", "Guardians", "Cleveland"]),
    ("COL", &["Colorado Rockies", "Rockies", "Colorado"]),
    ("DET", &["Detroit Tigers", "Tigers", "Detroit"]),
    ("HOU", &["Houston Astros", "Astros", "Houston"]),
    ("KC", &["Kansas City Royals", "Royals", "Kansas City", "KCR"]),
    ("LAA", &["Los Angeles Angels", "LA Angels", "Angels", "Anaheim"]),
    ("LAD", &["Los Angeles Dodgers", "LA Dodgers", "Dodgers"]),
    ("MIA", &["Miami Marlins", "Marlins", "Miami"]),
    ("MIL", &["Milwaukee Brewers", "Brewers", "Milwaukee"]),
    ("MIN", &["Minnesota Twins", "Twins", "Minnesota"]),
    ("NYM", &["New York Mets", "Mets", "NY Mets"]),
    ("NYY", &["New York Yankees", "Yankees", "NY Yankees"]),
    ("ATH", &["Athletics", "Oakland Athletics", "A's", "Oakland", "OAK"]),
    ("PHI", &["Philadelphia Phillies", "Phillies", "Philadelphia"]),
    ("PIT", &["Pittsburgh Pirates", "Pirates", "Pittsburgh"]),
    ("SD", &["San Diego Padres", "Padres", "San Diego", "SDP"]),
    ("SF", &["San Francisco Giants", "San Francisco", "SFG"]),
    ("SEA", &["Seattle Mariners", "Mariners", "Seattle"]),
    ("STL", &["St. Louis Cardinals", "St Louis", "St. Louis"]),
    ("TB", &["Tampa Bay Rays", "Rays", "Tampa Bay", "TBR"]),
    ("TEX", &["Texas Rangers", "Texas"]),
    ("TOR", &["Toronto Blue Jays", "Blue Jays", "Toronto"]),
    ("WSH", &["Washington Nationals", "Nationals", "Nats", "Washington", "WAS"]),
];

pub const NHL: &[TeamRow] = &[
    ("ANA", &["Anaheim Ducks", "Ducks", "Anaheim"]),
    ("BOS", &["Boston Bruins", "Bruins", "Boston"]),
    ("BUF", &["Buffalo Sabres", "Sabres", "Buffalo"]),
    ("CGY", &["Calgary Flames", "Flames", "Calgary"]),
    ("CAR", &["Carolina Hurricanes", "Hurricanes", "Canes", "Carolina"]),
    ("CHI", &["Chicago Blackhawks", "Blackhawks", "Chicago"]),
    ("COL", &["Colorado Avalanche", "Avalanche", "Colorado"]),
    ("CBJ", &["Columbus Blue Jackets", "Blue Jackets", "Columbus"]),
    ("DAL", &["Dallas Stars", "Stars", "Dallas"]),
    ("DET", &["Detroit Red Wings", "Red Wings", "Detroit"]),
    ("EDM", &["Edmonton Oilers", "Oilers", "Edmonton"]),
    ("FLA", &["Florida Panthers", "Florida"]),
    ("LAK", &["Los Angeles Kings", "LA Kings", "LA"]),
    ("MIN", &["Minnesota Wild", "Wild", "Minnesota"]),
    ("MTL", &["Montreal Canadiens", "Canadiens", "Habs", "Montreal"]),
    ("NSH", &["Nashville Predators", "Predators", "Preds", "Nashville"]),
    ("NJD", &["New Jersey Devils", "Devils", "New Jersey", "NJ"]),
    ("NYI", &["New York Islanders", "Islanders", "NY Islanders"]),
    ("NYR", &["New York Rangers", "NY Rangers"]),
    ("OTT", &["Ottawa Senators", "Senators", "Ottawa"]),
    ("PHI", &["Philadelphia Flyers", "Flyers", "Philadelphia"]),
    ("PIT", &["Pittsburgh Penguins", "Penguins", "Pittsburgh"]),
    ("SJS", &["San Jose Sharks", "Sharks", "San Jose", "SJ"]),
    ("SEA", &["Seattle Kraken", "Kraken", "Seattle"]),
    ("STL", &["St. Louis Blues", "Blues", "St Louis", "St. Louis"]),
    ("TB", &["Tampa Bay Lightning", "Lightning", "Tampa Bay", "TBL"]),
    ("TOR", &["Toronto Maple Leafs", "Maple Leafs", "Leafs", "Toronto"]),
    ("UTA", &["Utah Hockey Club", "Utah Mammoth", "Mammoth", "Utah"]),
    ("VAN", &["Vancouver Canucks", "Canucks", "Vancouver"]),
    ("VGK", &["Vegas Golden Knights", "Golden Knights", "Vegas", "VEG"]),
    ("WSH", &["Washington Capitals", "Capitals", "Caps", "Washington", "WAS"]),
    ("WPG", &["Winnipeg Jets", "Winnipeg"]),
];

pub const NCAAF: &[TeamRow] = &[
    ("OHIO", &["Ohio", "Ohio Bobcats", "Bobcats"]),
    ("RUTG", &["Rutgers", "Rutgers Scarlet Knights", "Scarlet Knights", "RUTGERS"]),
    ("BSU", &["Boise State", "Boise St.", "Boise State Broncos", "BOISE"]),
    ("USF", &["South Florida", "South Florida Bulls", "SOUTHFLA"]),
    ("MIAMI", &["Miami (OH)", "Miami OH", "Miami RedHawks", "RedHawks", "MIAMIOH"]),
    ("NCST", &["NC State", "North Carolina State", "NC State Wolfpack", "Wolfpack", "NCSTATE"]),
    ("ECU", &["East Carolina", "East Carolina Pirates"]),
    ("WYO", &["Wyoming", "Wyoming Cowboys", "WYOMING"]),
    ("AKR", &["Akron", "Akron Zips", "Zips", "AKRON"]),
    ("UCF", &["Central Florida", "UCF Knights"]),
    ("JSU", &["Jacksonville State", "Jacksonville St.", "Jacksonville State Gamecocks"]),
    ("WSU", &["Washington State", "Washington St.", "Washington State Cougars"]),
    ("SDSU", &["San Diego State", "San Diego St.", "San Diego State Aztecs", "Aztecs"]),
    ("WASH", &["Washington", "Washington Huskies", "UW"]),
    ("ASU", &["Arizona State", "Arizona St.", "Arizona State Sun Devils", "Sun Devils"]),
    ("MSST", &["Mississippi State", "Mississippi St.", "Mississippi State Bulldogs"]),
    ("UCLA", &["UCLA Bruins"]),
    ("UNLV", &["UNLV Rebels", "Rebels"]),
];

// College basketball shares the football program names and codes.
pub const NCAAB: &[TeamRow] = NCAAF;
